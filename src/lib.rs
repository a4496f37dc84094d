extern crate nalgebra as na;

pub mod document;
pub mod geometry;
pub mod obj_parser;
pub mod scene;
pub mod scene_parser;
pub mod surface_parser;
pub mod transform;


pub use scene::Scene;
pub use scene_parser::{ParseError, ParseResult, SceneParser};
