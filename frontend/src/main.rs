mod beeper;
mod keymap;

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use anyhow::{ensure, Context, Result};
use chip8_vm_core::{
    Chip8Builder, Chip8Color, Chip8Mode, Keys, Quirks, DEFAULT_BACKGROUND_COLOR,
    DEFAULT_FOREGROUND_COLOR, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use clap::{Parser, ValueEnum};
use sdl2::{event::Event, keyboard::Keycode, pixels::PixelFormatEnum};

use crate::{beeper::Beeper, keymap::keypad_index};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Original COSMAC VIP behaviour, all legacy quirks on
    CosmacVip,
    /// CHIP-48 behaviour, all legacy quirks off
    Chip48,
}

impl From<Mode> for Chip8Mode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::CosmacVip => Chip8Mode::COSMAC_VIP,
            Mode::Chip48 => Chip8Mode::CHIP_48,
        }
    }
}

/// CHIP-8 Emulator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Filepath to Chip-8 ROM file that will be executed
    #[clap(index = 1)]
    rom: PathBuf,

    /// Filepath to font file (80 bytes, 16 glyphs of 5 bytes)
    #[clap(long)]
    font: Option<PathBuf>,

    /// Background Color as HEX 0xAABBFF [default: 0x000000]
    #[clap(long)]
    background: Option<Chip8Color>,

    /// Foreground Color as HEX 0xAABBFF [default: 0xFFFFFF]
    #[clap(long)]
    foreground: Option<Chip8Color>,

    /// Display scaling factor
    #[clap(short, long, default_value_t = 10)]
    scale: u32,

    /// Instructions per second
    #[clap(short, long, default_value_t = 700)]
    ips: u32,

    /// PRNG seed
    #[clap(long)]
    seed: Option<u64>,

    /// Quirk preset
    #[clap(long, value_enum, default_value_t = Mode::CosmacVip)]
    mode: Mode,

    /// Shift VX in place instead of shifting VY into VX
    #[clap(long)]
    no_legacy_shift: bool,

    /// Jump to XNN + VX instead of NNN + V0
    #[clap(long)]
    no_legacy_jump: bool,

    /// Leave I untouched after FX55/FX65
    #[clap(long)]
    no_legacy_memory_increment: bool,

    /// Print debug information
    #[clap(short, long)]
    debug: bool,
}

impl Args {
    fn quirks(&self) -> Quirks {
        let mut quirks = Quirks::for_mode(self.mode.into());
        if self.no_legacy_shift {
            quirks.legacy_shift = false;
        }
        if self.no_legacy_jump {
            quirks.legacy_jump = false;
        }
        if self.no_legacy_memory_increment {
            quirks.legacy_memory_increment = false;
        }
        quirks
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    ensure!(
        (1..=100).contains(&args.scale),
        "Display scaling factor must be between [1-100]"
    );
    ensure!(
        (1..=1_000_000).contains(&args.ips),
        "Instructions per second [1-1000000]"
    );

    let rom_data = std::fs::read(&args.rom)
        .with_context(|| format!("failed to read ROM file {}", args.rom.display()))?;

    let mut builder = Chip8Builder::new()
        .with_rom(rom_data)
        .with_quirks(args.quirks())
        .with_debug(args.debug);

    if let Some(font) = &args.font {
        let font_data = std::fs::read(font)
            .with_context(|| format!("failed to read font file {}", font.display()))?;
        builder = builder.with_font(font_data);
    }

    if let Some(seed) = args.seed {
        builder = builder.with_rng_seed(seed);
    }

    let mut chip = builder.build().context("failed to load ROM")?;
    log::info!("running {} with {:?}", args.rom.display(), chip.quirks());

    let foreground = args.foreground.unwrap_or(DEFAULT_FOREGROUND_COLOR);
    let background = args.background.unwrap_or(DEFAULT_BACKGROUND_COLOR);

    let sdl_context = sdl2::init().map_err(anyhow::Error::msg)?;
    let video_subsystem = sdl_context.video().map_err(anyhow::Error::msg)?;

    let window = video_subsystem
        .window(
            "chip8-emulator",
            SCREEN_WIDTH as u32 * args.scale,
            SCREEN_HEIGHT as u32 * args.scale,
        )
        .position_centered()
        .build()?;

    let mut canvas = window.into_canvas().build()?;
    canvas.clear();
    canvas.present();

    let texture_creator = canvas.texture_creator();
    let mut texture = texture_creator.create_texture_streaming(
        PixelFormatEnum::RGBX8888,
        SCREEN_WIDTH as u32,
        SCREEN_HEIGHT as u32,
    )?;

    // A missing audio device should not stop the game
    let mut beeper = match sdl_context
        .audio()
        .map_err(anyhow::Error::msg)
        .and_then(|audio| Beeper::open(&audio))
    {
        Ok(beeper) => Some(beeper),
        Err(err) => {
            log::warn!("sound disabled: {:#}", err);
            None
        }
    };

    let mut event_pump = sdl_context.event_pump().map_err(anyhow::Error::msg)?;

    let mut keys = Keys::NONE;
    let mut pixels = vec![background; SCREEN_WIDTH * SCREEN_HEIGHT];

    let delta_update = Duration::new(0, 1_000_000_000u32 / args.ips);
    let mut next_update = Instant::now();

    'running: loop {
        // Wait until next update
        let now = Instant::now();
        if let Some(delay) = next_update.checked_duration_since(now) {
            thread::sleep(delay);
        }
        next_update += delta_update;

        // Process events
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => {
                    if let Some(idx) = keypad_index(key) {
                        keys.press(idx);
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(idx) = keypad_index(key) {
                        keys.release(idx);
                    }
                }
                _ => {}
            }
        }

        // Catch up timers and run one CHIP-8 instruction
        if let Err(err) = chip.tick(keys, Instant::now()) {
            log::error!(
                "halted at pc 0x{:04x}, I 0x{:04x}, V {:02x?}",
                chip.pc(),
                chip.index(),
                chip.registers()
            );
            return Err(err).context("emulation stopped");
        }

        if let Some(beeper) = beeper.as_mut() {
            beeper.set_playing(chip.sound_active());
        }

        // If display buffer was changed then draw changes on canvas
        if chip.display().is_dirty() {
            chip.display().render_into(foreground, background, &mut pixels);

            // Copy CHIP-8 display buffer into GPU texture
            texture.update(None, Chip8Color::as_bytes(&pixels), SCREEN_WIDTH * 4)?;

            // Copy texture to Canvas
            canvas
                .copy(&texture, None, None)
                .map_err(anyhow::Error::msg)?;

            // present canvas on screen
            canvas.present();
            chip.display_mut().mark_clean();
        }
    }

    log::info!("Goodbye");
    Ok(())
}
