use std::time::Duration;

use tourbridge::backends::virtual_input::VirtualDevice;
use tourbridge::sim::{BrushSettings, RecordingEffector, SimHost};
use tourbridge::{
    listener, BridgeConfig, Dispatcher, HostStore, InputEventBus, PendingCapture, Wheel,
};

fn main() {
    tourbridge::logger::init("debug");
    let config = BridgeConfig::default();

    // Script a short session: scrub the timeline, hold a modifier, enter sculpt mode
    // and resize the brush.
    let mut device = VirtualDevice::new("virtual:demo", "Demo Tourbox");
    device
        .turn(Wheel::FlatWheel, 3)
        .press("SideThumb")
        .release("SideThumb")
        .press("LogoButtonRight")
        .release("LogoButtonRight")
        .turn(Wheel::TallDial, 2)
        .press("TallDial")
        .turn(Wheel::TallDial, -1)
        .release("TallDial");

    let host = SimHost::new().with_brush("Draw", BrushSettings::default());
    let mut dispatcher = Dispatcher::new(
        &config,
        host,
        RecordingEffector::new(),
        Box::new(PendingCapture::failed),
    );

    let mut bus = InputEventBus::new();
    let handle =
        listener::spawn(device, bus.sender(), &config.transport).expect("spawn listener");
    while !handle.is_finished() {
        bus.pump_timeout(&mut dispatcher, Duration::from_millis(10));
    }
    let reason = handle.join();
    while bus.pump(&mut dispatcher) > 0 {}

    let (host, effector) = dispatcher.into_parts();
    println!("listener stopped: {reason:?}");
    println!("mode = {}, frame = {}", host.mode(), host.frame());
    if let Some(brush) = host.current_brush() {
        println!("{} -> {:?}", brush.0, host.brush_settings(brush));
    }
    for command in &effector.commands {
        println!("(Effector) {command:?}");
    }
}
