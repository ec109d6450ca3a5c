use clap::Parser;
use looptone_synth::{DEFAULT_DEVICE, SampleFormat, TuneSpec};

const VERSION: &str = env!("LOOPTONE_VERSION");

/// Play a one-second generated tone in a loop through `aplay`. Use Ctrl-C to exit.
#[derive(Parser, Debug)]
#[command(name = "looptone", version = VERSION)]
pub struct Args {
    /// ALSA output device, e.g. default, dmix, hw:CARD=0,DEV=0 (see `aplay -L`)
    #[arg(short = 'D', long, default_value = DEFAULT_DEVICE)]
    pub device: String,

    /// Sample format: S16_LE, S16_BE, S32_LE or S32_BE [default: S32_LE for dmix, else S16_LE]
    #[arg(short = 'f', long)]
    pub format: Option<SampleFormat>,

    /// Tune: sin, sine, sinlh, sinl, sinh, square or bits:<pattern> (1200 bits/s)
    #[arg(short = 'T', long, default_value = "sinlh")]
    pub tune: TuneSpec,

    /// Sink program that receives raw PCM on stdin
    #[arg(long, default_value = "aplay")]
    pub sink: String,
}
