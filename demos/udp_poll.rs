//! Prints every token arriving on the bridge's UDP port. Handy for checking
//! what the hardware daemon actually sends.

use std::time::Duration;

use tourbridge::backends::udp::UdpDevice;
use tourbridge::config::TransportConfig;
use tourbridge::{listener, InputEvent, InputEventBus, InputListener};

struct Print;

impl InputListener for Print {
    fn on_input(&mut self, event: &InputEvent) {
        println!("{:>24}  {:?}", event.token, event.kind);
    }
}

fn main() -> anyhow::Result<()> {
    tourbridge::logger::init("info");
    let config = TransportConfig::default();
    let device = UdpDevice::bind(&config)?;
    println!("Listening on {}", device.local_addr()?);

    let mut bus = InputEventBus::new();
    let handle = listener::spawn(device, bus.sender(), &config)?;
    while !handle.is_finished() {
        bus.pump_timeout(&mut Print, Duration::from_millis(100));
    }
    while bus.pump(&mut Print) > 0 {}
    println!("stopped: {:?}", handle.join());
    Ok(())
}
