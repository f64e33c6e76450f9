//! # Smidja: Declarative Scene Assembly
//!
//! Smidja takes a list of declarative *instructions* (usually produced by an
//! assistant that was asked to "add a hero with a walk animation") and applies
//! them, in order, to an in-memory 2D scene tree.
//!
//! ```text
//!  [{"action": "create_node", ...},        SceneTree
//!   {"action": "set_properties", ...},     Main (Node2D)
//!   {"action": "add_child", ...}]   ──►     └─ Hero (CharacterBody2D)
//!                                               ├─ HeroSprite (AnimatedSprite2D)
//!                                               └─ HeroCollision (CollisionShape2D)
//! ```
//!
//! Start with [`SceneAssembler`](engine::SceneAssembler): give it a
//! [`ResourceLoader`](resource::ResourceLoader), hand it a
//! [`SceneTree`](tree::SceneTree) and a batch of
//! [`Instruction`](instruction::Instruction)s. Every instruction is applied on
//! a best-effort basis: failures are logged and reported per instruction, and
//! the batch always runs to completion.

pub mod behavior;
pub mod configure;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod factory;
pub mod instruction;
pub mod math;
pub mod node;
pub mod prelude;
pub mod registry;
pub mod resource;
pub mod tree;
pub mod value;
