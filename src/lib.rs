//! smart-fridge - 冷蔵庫写真からレシピ提案までのワークフロー

pub mod analyzer;
pub mod api;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod review;
pub mod scanner;
pub mod upload;
pub mod workflow;
