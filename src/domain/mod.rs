pub mod ai;
pub mod animation;
pub mod collision;
pub mod controls;
pub mod entity;
pub mod geometry;
pub mod grid;
pub mod physics;
pub mod tile;
