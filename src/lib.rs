//! Chart catalog over a tabular health-metrics dataset.
//!
//! Load the table once with [`init_dataset`], then ask the [`Catalog`] for any
//! chart by name. Every render returns a fresh [`Figure`] that can be saved
//! as PNG or SVG.

pub mod catalog;
pub mod charts;
pub mod cluster;
pub mod config;
pub mod console;
pub mod dataset;
pub mod derived;
mod draw;
pub mod error;
pub mod figure;
pub mod models;
pub mod output;
pub mod stats;

#[cfg(test)]
mod fixtures;

pub use catalog::{list_categories, render, Catalog, Category, ChartSource, RenderParams};
pub use dataset::{get_dataset, init_dataset, Dataset};
pub use error::{Result, VizError};
pub use figure::{Figure, ImageFormat};
