#![doc = include_str!("../README.md")]

pub mod auth;
pub mod metadata;
pub mod temp_url;

mod account;
mod client;
mod container;
mod entity;
mod error;
pub(crate) mod utils;

pub use account::Account;
pub use client::{Client, ContainerInfo};
pub use container::{Container, ObjectBody, ObjectInfo};
pub use entity::Entity;
pub use error::Error;
pub use metadata::{EntityKind, MetadataMap};
