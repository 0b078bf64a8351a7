use anyhow::{anyhow, Result};
use sdl2::{
    audio::{AudioCallback, AudioDevice, AudioSpecDesired},
    AudioSubsystem,
};

const TONE_HZ: f32 = 440.0;
const VOLUME: f32 = 0.05;

struct SquareWave {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [Self::Channel]) {
        for x in out.iter_mut() {
            self.phase = (self.phase + self.phase_inc) % 1.0;
            *x = if self.phase < 0.5 { self.volume } else { -self.volume };
        }
    }
}

/// Square wave tone gated by the sound timer
pub struct Beeper {
    device: AudioDevice<SquareWave>,
    playing: bool,
}

impl Beeper {
    pub fn open(audio: &AudioSubsystem) -> Result<Beeper> {
        let spec = AudioSpecDesired {
            freq: Some(44100),
            channels: Some(1),
            samples: None,
        };

        let device = audio
            .open_playback(None, &spec, |spec| SquareWave {
                phase_inc: TONE_HZ / spec.freq as f32,
                phase: 0.0,
                volume: VOLUME,
            })
            .map_err(|e| anyhow!("failed to open audio device: {}", e))?;

        Ok(Beeper {
            device,
            playing: false,
        })
    }

    pub fn set_playing(&mut self, playing: bool) {
        if self.playing == playing {
            return;
        }

        self.playing = playing;
        if playing {
            self.device.resume();
        } else {
            self.device.pause();
        }
    }
}
