use scenedom::scene::{Aabb, BoundsHitTester, PerspectiveCamera};
use scenedom::{
    EventDispatcher, EventKind, PointerSampler, PointerSamplerDesc, QueuedSurface,
    RawPointerEvent, SceneNode, Vec3,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Example: a cube inside a group, driven by pointer events arriving from another thread
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    println!("scenedom cube scene");

    let width = 800.0;
    let height = 600.0;
    let surface = Rc::new(QueuedSurface::new(width, height));
    let dispatcher = Rc::new(EventDispatcher::new());
    let hit_tester = Rc::new(RefCell::new(BoundsHitTester::new()));
    let camera = Rc::new(PerspectiveCamera {
        aspect: width / height,
        ..PerspectiveCamera::default()
    });

    let group = SceneNode::new("group");
    let cube = SceneNode::with_parent("cube", &group);
    hit_tester
        .borrow_mut()
        .set_bounds(&cube, Aabb::from_center_size(Vec3::ZERO, Vec3::ONE));

    for kind in EventKind::ALL {
        dispatcher.add_event_listener(
            &cube,
            kind,
            |event| {
                log::info!("{} on {}", event.kind, event.object.name());
                Ok(())
            },
            false,
        );
    }

    // Bubbled events reach the group even though it has no bounds of its own.
    dispatcher.add_event_listener_named(
        &group,
        "click",
        |event| {
            println!("Group saw a click on {}", event.object.name());
            Ok(())
        },
        false,
    )?;

    let mut pointer = PointerSampler::bind(
        camera,
        hit_tester.clone(),
        surface.clone(),
        Rc::clone(&dispatcher),
        PointerSamplerDesc::default(),
    );

    let center = (width / 2.0, height / 2.0);
    let sender = surface.sender();
    std::thread::spawn(move || {
        let script = [
            RawPointerEvent::moved(center.0, center.1),
            RawPointerEvent::moved(10.0, 10.0),
            RawPointerEvent::moved(center.0, center.1),
            RawPointerEvent::down(center.0, center.1),
            RawPointerEvent::up(center.0, center.1),
        ];
        for event in script {
            if sender.send(event).is_err() {
                break;
            }
        }
    })
    .join()
    .map_err(|_| anyhow::anyhow!("Input thread panicked"))?;

    let delivered = surface.pump()?;
    println!("Delivered {} raw pointer events", delivered);

    pointer.with_context(|context| {
        println!(
            "Hovering: {:?}",
            context.last_mouse_move_object().map(|o| o.name().to_string())
        );
    })?;

    pointer.dispose();
    println!("Remaining surface subscriptions: {}", surface.subscription_count());

    Ok(())
}
