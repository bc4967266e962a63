//! Whole rounds driven through the public loop API: bytes in on the receive
//! ring, pin levels in, telemetry bytes out.

use shipshot::{
    Arcade,
    Entropy,
    GameConfig,
    Level,
    RxRing,
    ShipKind,
    State,
    Uplink,
    XorShift32,
};

const RELEASED: [Level; 3] = [Level::High; 3];

/// Collects everything the arcade sends.
#[derive(Default)]
struct Host {
    received: Vec<u8>,
}

impl Uplink for Host {
    fn write(&mut self, bytes: &[u8]) -> usize {
        self.received.extend_from_slice(bytes);
        bytes.len()
    }
}

impl Host {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.received)
            .split("\r\n")
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// Always rolls zero: every ship is small and spawns in the top-left corner.
struct Zero;

impl Entropy for Zero {
    fn next_u32(&mut self) -> u32 {
        0
    }
}

struct Rig<R: Entropy> {
    arcade: Arcade<R, 4096>,
    rx: RxRing<64>,
    host: Host,
    now: u32,
}

impl<R: Entropy> Rig<R> {
    fn new(rng: R) -> Self {
        Self {
            arcade: Arcade::new(GameConfig::default(), rng, 0),
            rx: RxRing::new(),
            host: Host::default(),
            now: 0,
        }
    }

    fn send(&mut self, line: &str) {
        self.rx.publish(line.as_bytes());
        self.rx.publish(b"\r\n");
        self.step(RELEASED);
    }

    fn step(&mut self, levels: [Level; 3]) {
        self.arcade.step(self.now, levels, &self.rx);
        self.arcade.drain(&mut self.host);
    }

    /// Advance the clock in 10 ms loop iterations with buttons released.
    fn run_for(&mut self, ms: u32) {
        let end = self.now + ms;
        while self.now < end {
            self.now += 10;
            self.step(RELEASED);
        }
    }

    /// Press and release one button, honouring the poll cadence.
    fn press(&mut self, index: usize) {
        let mut levels = RELEASED;
        levels[index] = Level::Low;
        self.now += 30;
        self.step(levels);
        self.now += 30;
        self.step(RELEASED);
    }
}

#[test]
fn full_round_ends_and_stops_spawning() {
    let mut rig = Rig::new(XorShift32::new(0x5EED));
    rig.send("CMD:START");
    rig.run_for(60_000);

    let session = rig.arcade.session();
    assert_eq!(session.state(), State::Ended);
    assert_eq!(session.time_remaining(), 0);

    let lines = rig.host.lines();
    assert_eq!(lines.iter().filter(|l| l.starts_with("TIME:")).count(), 61);
    assert!(lines.iter().any(|l| l == "GAME_EVENT:GAME_END:0"));
    let spawned = lines.iter().filter(|l| l.starts_with("SHIP:")).count();
    assert_eq!(spawned, 29);

    rig.run_for(10_000);
    let later = rig.host.lines();
    assert_eq!(later.iter().filter(|l| l.starts_with("SHIP:")).count(), spawned);
    assert_eq!(later.len(), lines.len());
}

#[test]
fn remote_shot_hits_once() {
    let mut rig = Rig::new(XorShift32::new(1));
    rig.send("CMD:START");
    rig.arcade
        .session_mut()
        .ships_mut()
        .place(0, ShipKind::Small, 400, 300);

    rig.send("CMD:SHOT:400,300");
    rig.send("CMD:SHOT:400,300");

    let lines = rig.host.lines();
    let results: Vec<_> = lines.iter().filter(|l| l.starts_with("RESULT:")).collect();
    assert_eq!(results, ["RESULT:HIT:S,400,300", "RESULT:MISS,400,300"]);
    let board = rig.arcade.session().scoreboard();
    assert_eq!((board.score, board.hits, board.shots), (10, 1, 2));
    assert_eq!(board.accuracy(), 50);
}

#[test]
fn left_presses_step_and_clamp() {
    let mut rig = Rig::new(XorShift32::new(2));
    rig.send("S");
    for _ in 0..3 {
        rig.press(0);
    }
    assert_eq!(rig.arcade.session().aim().x, 325);

    for _ in 0..20 {
        rig.press(0);
    }
    assert_eq!(rig.arcade.session().aim().x, 40);
    assert!(rig.host.lines().iter().any(|l| l == "CROSSHAIR:40,300,0"));
}

#[test]
fn lock_sweep_and_fire_with_buttons() {
    let mut rig = Rig::new(Zero);
    rig.send("CMD:START");
    // First spawn lands at the spawn area origin.
    rig.run_for(2_000);
    assert!(rig.host.lines().iter().any(|l| l == "SHIP:S,40,40"));

    rig.press(2);
    assert!(rig.arcade.session().aim().locked);
    rig.run_for(500);
    let y = rig.arcade.session().aim().y;
    assert_ne!(y, 300);

    rig.press(2);
    let aim = rig.arcade.session().aim();
    assert!(!aim.locked);
    let expected = format!("RESULT:MISS,{},{}", aim.x, aim.y);
    assert!(rig.host.lines().iter().any(|l| *l == expected));
    assert_eq!(rig.arcade.session().scoreboard().shots, 1);
}

#[test]
fn pause_resume_and_reset_over_serial() {
    let mut rig = Rig::new(XorShift32::new(3));
    rig.send("CMD:START");
    rig.run_for(3_000);
    rig.send("CMD:PAUSE");
    let frozen = rig.arcade.session().time_remaining();
    rig.run_for(5_000);
    assert_eq!(rig.arcade.session().time_remaining(), frozen);

    rig.send("P");
    rig.run_for(1_000);
    assert_eq!(rig.arcade.session().time_remaining(), frozen - 1);

    rig.send("CMD:RESET");
    assert_eq!(rig.arcade.session().state(), State::Idle);
    assert_eq!(rig.arcade.readout().value, 60);
    assert!(rig.host.lines().iter().any(|l| l == "COM: reset=1"));
}

#[test]
fn garbage_and_overlong_lines_are_survivable() {
    let mut rig = Rig::new(XorShift32::new(4));
    rig.send("HELLO");
    rig.send(&"X".repeat(40));
    rig.send("CMD:STORM_UPDATE:5,-20");
    rig.send("STATUS");

    let lines = rig.host.lines();
    assert_eq!(
        lines,
        ["COM: hello, state=idle", "COM: storm=15,0", "GAME:0:0:0:0:60"]
    );
    assert_eq!(rig.arcade.decoder().overflows(), 1);
}
