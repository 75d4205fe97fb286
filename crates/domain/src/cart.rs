//! The session-scoped shopping cart.

use std::collections::BTreeMap;

use common::CourseId;
use serde::{Deserialize, Serialize};

/// A mapping from course id to unit quantity.
///
/// Every current flow inserts quantity 1 and adding an existing course is
/// a no-op, but the shape permits higher quantities. Keys are typed
/// [`CourseId`]s in memory; they become strings only in the JSON session
/// transport, where UUIDs serialize as object keys.
///
/// The map is ordered by key, which fixes the course order of
/// [`CheckoutService::view_cart`](crate::CheckoutService::view_cart).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: BTreeMap<CourseId, u32>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course with quantity 1.
    ///
    /// Idempotent: a course already in the cart keeps its quantity.
    pub fn add(&mut self, course: CourseId) {
        self.items.entry(course).or_insert(1);
    }

    /// Removes a course. Removing an absent course is a silent no-op.
    pub fn remove(&mut self, course: CourseId) {
        self.items.remove(&course);
    }

    /// Returns true if the course is in the cart.
    pub fn contains(&self, course: CourseId) -> bool {
        self.items.contains_key(&course)
    }

    /// Returns the quantity for a course, if present.
    pub fn quantity(&self, course: CourseId) -> Option<u32> {
        self.items.get(&course).copied()
    }

    /// Returns the course ids in key order.
    pub fn course_ids(&self) -> Vec<CourseId> {
        self.items.keys().copied().collect()
    }

    /// Returns the number of distinct courses.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart holds no courses.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut cart = Cart::new();
        let course = CourseId::new();

        cart.add(course);
        cart.add(course);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity(course), Some(1));
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.remove(CourseId::new());
        assert!(cart.is_empty());
    }

    #[test]
    fn remove_deletes_entry() {
        let mut cart = Cart::new();
        let a = CourseId::new();
        let b = CourseId::new();
        cart.add(a);
        cart.add(b);

        cart.remove(a);

        assert!(!cart.contains(a));
        assert!(cart.contains(b));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn course_ids_are_key_ordered() {
        let mut cart = Cart::new();
        let mut ids = vec![CourseId::new(), CourseId::new(), CourseId::new()];
        for id in &ids {
            cart.add(*id);
        }
        ids.sort();

        assert_eq!(cart.course_ids(), ids);
    }

    #[test]
    fn transport_shape_is_string_keyed_object() {
        let mut cart = Cart::new();
        let course = CourseId::new();
        cart.add(course);

        let json = serde_json::to_value(&cart).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object.get(&course.to_string()), Some(&serde_json::json!(1)));

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
