//! Applies a sample assistant reply to a fresh scene and prints the result.
//!
//! ```text
//! RUST_LOG=debug cargo run -p smidja --example apply_reply
//! ```

use smidja::prelude::*;

const REPLY: &str = include_str!("../../../demos/hero_reply.json");

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let reply = match AssistantReply::from_json_str(REPLY) {
        Ok(reply) => reply,
        Err(e) => {
            eprintln!("sample reply is not valid JSON: {e}");
            return;
        }
    };

    let loader = MemoryLoader::new().with_texture("res://assets/sprites/knight.png", 64, 64);
    let mut assembler = SceneAssembler::new(TextureCache::new(loader));
    let mut tree = SceneTree::new(Node::new("Main", "Node2D", NodeKind::Spatial));

    let report = assembler.apply_reply(&mut tree, &reply);

    print!("{}", tree.dump());
    println!("{report}");

    if let Some(sprite) = tree.try_named("HeroSprite").and_then(|id| tree[id].animated_sprite()) {
        println!(
            "HeroSprite plays '{}' (autoplay: {:?})",
            sprite.animation, sprite.autoplay
        );
    }
}
