use herald_bus::Event;

#[derive(Debug, Default, Event)]
struct Ping {
    canceled: bool,
}

#[derive(Debug, Default, Event)]
struct Renamed<T: 'static> {
    payload: T,
    #[event(canceled)]
    vetoed: bool,
}

fn main() {
    let mut ping = Ping::default();
    ping.cancel();
    assert!(ping.is_canceled());

    let mut renamed = Renamed { payload: 7_u8, vetoed: false };
    renamed.set_canceled(true);
    assert!(renamed.vetoed);
}
