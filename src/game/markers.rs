//! Player-placed map markers

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::types::Coords;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerError {
    #[error("marker must have a name")]
    EmptyName,

    #[error("marker name is {len} characters, the limit is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("markers can only be placed on the map")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: Uuid,
    pub name: String,
    pub coords: Coords,
}

#[derive(Debug, Clone)]
pub struct MarkerBook {
    markers: Vec<Marker>,
    max_name_len: usize,
}

impl MarkerBook {
    pub fn new(max_name_len: usize) -> Self {
        Self {
            markers: Vec::new(),
            max_name_len,
        }
    }

    pub fn add(&mut self, name: &str, coords: Coords) -> Result<&Marker, MarkerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MarkerError::EmptyName);
        }
        let len = name.chars().count();
        if len > self.max_name_len {
            return Err(MarkerError::NameTooLong {
                len,
                max: self.max_name_len,
            });
        }

        self.markers.push(Marker {
            id: Uuid::new_v4(),
            name: name.to_string(),
            coords,
        });
        Ok(&self.markers[self.markers.len() - 1])
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Marker> {
        let pos = self.markers.iter().position(|m| m.id == id)?;
        Some(self.markers.remove(pos))
    }

    /// Remove all markers, returning how many there were
    pub fn clear(&mut self) -> usize {
        let n = self.markers.len();
        self.markers.clear();
        n
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut book = MarkerBook::new(40);
        let id = book.add("  Home ", Coords::new(1.0, 2.0)).unwrap().id;
        assert_eq!(book.iter().next().map(|m| m.name.as_str()), Some("Home"));
        assert!(book.remove(id).is_some());
        assert!(book.remove(id).is_none());
        assert!(book.is_empty());
    }

    #[test]
    fn test_name_rules() {
        let mut book = MarkerBook::new(5);
        assert_eq!(book.add("   ", Coords::default()).unwrap_err(), MarkerError::EmptyName);
        assert_eq!(
            book.add("abcdef", Coords::default()).unwrap_err(),
            MarkerError::NameTooLong { len: 6, max: 5 }
        );
        assert!(book.add("abcde", Coords::default()).is_ok());
    }

    #[test]
    fn test_clear_counts() {
        let mut book = MarkerBook::new(40);
        book.add("a", Coords::default()).unwrap();
        book.add("b", Coords::default()).unwrap();
        assert_eq!(book.clear(), 2);
        assert_eq!(book.clear(), 0);
    }
}
