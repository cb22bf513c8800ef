//! Typed indices for nodes and components.
//!
//! Components refer to nodes by index, and the public accessors hand out
//! references into the circuit's internal collections. Once the circuit is
//! locked those collections never resize, so an index is a permanent handle
//! for the circuit's lifetime.

use std::fmt;

/// A unique identifier for a node in the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// A unique identifier for a resistor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResistorId(pub usize);

impl fmt::Display for ResistorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// A unique identifier for a capacitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapacitorId(pub usize);

impl fmt::Display for CapacitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// A unique identifier for a linear amplifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinearAmpId(pub usize);

impl fmt::Display for LinearAmpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U{}", self.0)
    }
}

/// A unique identifier for a comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComparatorId(pub usize);

impl fmt::Display for ComparatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "K{}", self.0)
    }
}
