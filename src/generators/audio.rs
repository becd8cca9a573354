use super::duplicate_initializer;
use super::sd::{require_card, short_filename};
use crate::codegen::{Generator, Output};
use crate::order::Order;
use crate::workspace::Block;

pub fn freqout(g: &mut Generator<'_>, block: &Block) -> Output {
    let pin = g.pin(block, "PIN");
    let duration = g.clamped_value(block, "DURATION", 0, i64::from(i32::MAX), Order::None);
    let frequency = g.clamped_value(block, "FREQUENCY", 0, 20_000, Order::None);
    Output::statement(format!("freqout({}, {}, {});\n", pin, duration, frequency))
}

/// Starts the sound mixer cog on the left/right audio pins. The mixer
/// handle is a global shared by every `sound_play` block.
pub fn sound_init(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = duplicate_initializer(g, block, "sound initialize") {
        return Output::statement(line);
    }
    let left = g.pin(block, "PINL");
    let right = g.pin(block, "PINR");
    g.ctx.add_include("sound", "#include \"sound.h\"");
    g.ctx.add_global("sound_handle", "sound *audio0;");
    g.ctx
        .add_setup("sound_init", format!("audio0 = sound_run({}, {});", left, right));
    Output::statement("")
}

pub fn sound_play(g: &mut Generator<'_>, block: &Block) -> Output {
    if !g.workspace().contains_type("sound_init") {
        let line = g.warning(
            block,
            "You must use a sound initialize block at the beginning of your program!",
        );
        return Output::statement(line);
    }
    let channel = match g.field(block, "CHANNEL").as_str() {
        c @ ("1" | "2" | "3") => c.to_string(),
        _ => "0".to_string(),
    };
    let code = match g.field(block, "ACTION").as_str() {
        "VOLUME" => {
            let volume = g.clamped_value(block, "VALUE", 0, 127, Order::None);
            format!("sound_volume(audio0, {}, {});\n", channel, volume)
        }
        "WAVE" => {
            let wave = g.clamped_value(block, "VALUE", 0, 7, Order::None);
            format!("sound_wave(audio0, {}, {});\n", channel, wave)
        }
        "STOP" => format!("sound_volume(audio0, {}, 0);\n", channel),
        _ => {
            let frequency = g.clamped_value(block, "VALUE", 0, 20_000, Order::None);
            format!("sound_freq(audio0, {}, {});\n", channel, frequency)
        }
    };
    Output::statement(code)
}

pub fn wav_play(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = require_card(g, block) {
        return Output::statement(line);
    }
    let raw = g.field(block, "FILENAME");
    let stem = raw.split('.').next().unwrap_or_default();
    let filename = match short_filename(stem, "wav") {
        Ok(name) => name,
        Err(e) => return Output::statement(g.warning(block, format!("{}!", e))),
    };
    g.ctx.add_include("wavplayer", "#include \"wavplayer.h\"");
    Output::statement(format!("wav_play(\"{}\");\n", filename))
}

pub fn wav_volume(g: &mut Generator<'_>, block: &Block) -> Output {
    g.ctx.add_include("wavplayer", "#include \"wavplayer.h\"");
    let volume = g.clamped_value(block, "VOLUME", 0, 10, Order::None);
    Output::statement(format!("wav_volume({});\n", volume))
}

pub fn wav_stop(g: &mut Generator<'_>, _block: &Block) -> Output {
    g.ctx.add_include("wavplayer", "#include \"wavplayer.h\"");
    Output::statement("wav_stop();\n")
}
