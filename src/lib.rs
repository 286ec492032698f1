// src/lib.rs

//! toolwatch: AI repository collector and analyzer library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
