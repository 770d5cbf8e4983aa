//! Common type definitions and permission system types.
//!
//! This module defines:
//! - Type aliases for entity IDs (DishTypeId, DishId, CookId)
//! - Permission and authorization types
//! - Resource and operation enums for access control
//!
//! # ID Types
//!
//! All entity IDs are SQLite integer primary keys wrapped in type aliases so signatures say
//! which table they point into.
//!
//! # Permission System
//!
//! The permission system is based on three core types:
//!
//! - [`Resource`]: What record kind is being accessed (DishTypes, Dishes, Cooks)
//! - [`Operation`]: What action is being performed (Read, Create, Update, Delete)
//! - [`Permission`]: Authorization requirement combining resource and operation
//!
//! ## Operations
//!
//! Operations come in two flavors:
//! - **All**: Unrestricted access to all records (e.g., `ReadAll`, `DeleteAll`)
//! - **Own**: Restricted to the caller's own record (e.g., `ReadOwn`, `UpdateOwn`). Only
//!   cooks have an owner, since a cook is the caller's identity.

use std::fmt;

// Type aliases for IDs
pub type DishTypeId = i64;
pub type DishId = i64;
pub type CookId = i64;

// Operations that can be performed on resources
// *-All means unrestricted access, *-Own means restricted to own resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAll,
    ReadAll,
    ReadOwn,
    UpdateAll,
    UpdateOwn,
    DeleteAll,
}

// Resources that can be operated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    DishTypes,
    Dishes,
    Cooks,
}

// Permission types for authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    /// Simple permission: (Resource, Operation)
    Allow(Resource, Operation),
    /// Logical combinator, satisfied if any inner permission is
    Any(Vec<Permission>),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateAll => write!(f, "Create"),
            Operation::ReadAll | Operation::ReadOwn => write!(f, "Read"),
            Operation::UpdateAll | Operation::UpdateOwn => write!(f, "Update"),
            Operation::DeleteAll => write!(f, "Delete"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::DishTypes => write!(f, "dish types"),
            Resource::Dishes => write!(f, "dishes"),
            Resource::Cooks => write!(f, "cooks"),
        }
    }
}
