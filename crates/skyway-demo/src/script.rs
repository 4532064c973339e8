//! Timed control commands for the headless run.

use skyway_ecs::FlightInput;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Steer(f64),
    Release,
    Altitude { high: bool },
    Boost(f64),
}

/// Commands sorted by the session time, in seconds, at which they fire.
#[derive(Clone, Debug)]
pub struct FlightScript {
    steps: Vec<(f64, Command)>,
    next: usize,
}

impl FlightScript {
    pub fn new(mut steps: Vec<(f64, Command)>) -> Self {
        steps.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { steps, next: 0 }
    }

    /// Queue every command due by `elapsed` into `input`; returns how many.
    pub fn apply_due(&mut self, elapsed: f64, input: &mut FlightInput) -> usize {
        let start = self.next;
        while let Some(&(at, command)) = self.steps.get(self.next) {
            if at > elapsed {
                break;
            }
            match command {
                Command::Steer(turn) => input.steer(turn),
                Command::Release => input.release(),
                Command::Altitude { high } => input.set_altitude(high),
                Command::Boost(m) => input.set_fuel_boost(m),
            }
            self.next += 1;
        }
        self.next - start
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.steps.len()
    }
}

impl Default for FlightScript {
    /// A lazy right turn, a climb, a left turn with boost, then a descent.
    fn default() -> Self {
        Self::new(vec![
            (0.5, Command::Steer(0.6)),
            (2.0, Command::Release),
            (3.0, Command::Altitude { high: true }),
            (4.0, Command::Steer(-1.0)),
            (4.0, Command::Boost(1.5)),
            (6.0, Command::Release),
            (6.5, Command::Boost(1.0)),
            (8.0, Command::Altitude { high: false }),
        ])
    }
}
