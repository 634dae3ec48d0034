pub mod city;
pub mod config;
pub mod export;
pub mod geometry;
pub mod noise;
pub mod pipeline;
pub mod rng;
pub mod stages;
pub mod web;

pub use city::{City, FacilityType, RoadType, ZoneType};
pub use config::{CityConfig, ConfigLoader, GeneratorSettings, LayoutMode, TransportMode};
pub use export::{export_city, CitySummary, ExportError};
pub use pipeline::{generate, Pipeline, PipelineBuilder, Stage, StageReport};
