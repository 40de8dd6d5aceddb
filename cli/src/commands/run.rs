use std::io::Write;
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use tracing::{info, warn};

use chip8_emulator::constants::TIMER_RATE;
use chip8_emulator::runtime::{KeyPolicy, Machine, Quirks, Screen, SpriteEdge};

use crate::interactive::run_interactive;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SpriteEdgeOpt {
    /// Drop sprite pixels past the screen edge
    Clip,
    /// Wrap sprite pixels to the opposite edge
    Wrap,
}

impl From<SpriteEdgeOpt> for SpriteEdge {
    fn from(opt: SpriteEdgeOpt) -> Self {
        match opt {
            SpriteEdgeOpt::Clip => SpriteEdge::Clip,
            SpriteEdgeOpt::Wrap => SpriteEdge::Wrap,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KeyPolicyOpt {
    /// Release a key once a wait or skip consumed it
    Clear,
    /// Keep a key down until the host releases it
    Persist,
}

impl From<KeyPolicyOpt> for KeyPolicy {
    fn from(opt: KeyPolicyOpt) -> Self {
        match opt {
            KeyPolicyOpt::Clear => KeyPolicy::ClearOnConsume,
            KeyPolicyOpt::Persist => KeyPolicy::Persist,
        }
    }
}

#[derive(Parser, Debug)]
pub struct RunOpt {
    /// ROM file
    #[clap(value_parser, value_hint = ValueHint::FilePath)]
    input: Utf8PathBuf,

    /// Instructions executed per 60 Hz frame
    #[clap(long, default_value = "10")]
    steps_per_frame: u32,

    /// Stop after this many frames
    #[clap(long)]
    frames: Option<u64>,

    /// Sprite behavior at the screen edge
    #[clap(long, value_enum, default_value = "clip")]
    sprite_edge: SpriteEdgeOpt,

    /// Whether keys consumed by a wait or skip are auto-released
    #[clap(long, value_enum, default_value = "clear")]
    key_policy: KeyPolicyOpt,

    /// Run the program under the interactive debugger
    #[clap(short, long, action = ArgAction::SetTrue)]
    interactive: bool,
}

impl RunOpt {
    pub fn exec(self) -> anyhow::Result<()> {
        info!(path = %self.input, "reading ROM");
        let image = std::fs::read(&self.input)?;

        let mut machine = Machine::new(Quirks {
            sprite_edge: self.sprite_edge.into(),
            key_policy: self.key_policy.into(),
        });
        machine.load_program(&image)?;

        if self.interactive {
            run_interactive(&mut machine);
            return Ok(());
        }

        // The timers and the display run at a fixed 60 Hz; the CPU runs
        // steps_per_frame instructions in between.
        let frame_budget = Duration::from_secs(1) / TIMER_RATE;
        let mut frame = 0;
        loop {
            if self.frames == Some(frame) {
                break;
            }
            let started = Instant::now();

            for _ in 0..self.steps_per_frame {
                if let Err(e) = machine.step() {
                    warn!(error = &e as &dyn std::error::Error, "halted");
                    return Ok(());
                }
            }

            if machine.tick_timers() {
                info!("beep");
            }

            if machine.take_dirty() {
                present(machine.framebuffer())?;
            }

            frame += 1;
            if let Some(remaining) = frame_budget.checked_sub(started.elapsed()) {
                spin_sleep::sleep(remaining);
            }
        }

        Ok(())
    }
}

/// Clear the terminal and draw the frame at the top left
fn present(screen: &Screen) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "\x1B[2J\x1B[H{screen}")?;
    stdout.flush()
}
