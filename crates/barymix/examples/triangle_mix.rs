//! Drag a handle across a three-anchor mixer and print the weight track.
//!
//! Purpose
//! - Show the full engine round trip on the flagship triangle case: auto
//!   layout, boundary clamp, exact barycentric weights.
//! - The path deliberately leaves the polygon so the clamp is visible in
//!   the output.

use barymix::prelude::*;

fn main() {
    let registry = ScopeRegistry::new();
    let mut mixer = Mixer::new(
        &LayoutSpec::Auto(3),
        &LayoutCfg::default(),
        registry.allocate(),
    )
    .expect("three anchors form a valid layout");

    println!("scope {}", mixer.scope());
    for (i, a) in mixer.anchors().iter().enumerate() {
        println!("anchor {i}: ({:8.3}, {:8.3})", a.x, a.y);
    }

    let path = [
        Vec2::new(150.0, 150.0),
        Vec2::new(150.0, 0.0),    // apex
        Vec2::new(300.0, 259.81), // right base corner
        Vec2::new(150.0, 173.21), // centroid
        Vec2::new(-500.0, 400.0), // far outside; clamped to the polygon
    ];

    let mut signals = vec![PointerSignal::Start(path[0])];
    signals.extend(path[1..].iter().map(|p| PointerSignal::Move(*p)));
    signals.push(PointerSignal::End);

    for signal in signals {
        if let Some(update) = mixer.input(signal) {
            let w: Vec<String> = update.weights.iter().map(|v| format!("{v:.4}")).collect();
            println!(
                "handle ({:8.3}, {:8.3})  weights [{}]",
                update.position.x,
                update.position.y,
                w.join(", ")
            );
        }
    }
}
