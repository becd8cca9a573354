use super::duplicate_initializer;
use crate::codegen::{Generator, Output};
use crate::order::Order;
use crate::workspace::Block;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    ActivityBot,
    Arlo,
    ServoDiff,
}

impl Drive {
    fn from_field(raw: &str) -> Drive {
        match raw {
            "ARLO" => Drive::Arlo,
            "SERVO_DIFF" => Drive::ServoDiff,
            _ => Drive::ActivityBot,
        }
    }

    fn header(self) -> &'static str {
        match self {
            Drive::ActivityBot => "#include \"abdrive.h\"",
            Drive::Arlo => "#include \"arlodrive.h\"",
            Drive::ServoDiff => "#include \"servodiffdrive.h\"",
        }
    }

    fn top_speed(self) -> i64 {
        match self {
            Drive::ActivityBot => 128,
            Drive::Arlo => 200,
            Drive::ServoDiff => 100,
        }
    }

    fn speed_call(self) -> &'static str {
        match self {
            Drive::ServoDiff => "drive_speeds",
            _ => "drive_speed",
        }
    }
}

/// The drive chosen by the first initializer the program reaches.
fn configured_drive(g: &Generator<'_>) -> Option<Drive> {
    let workspace = g.workspace();
    let first = *workspace.blocks_of_type_in_program_order("ab_drive_init").first()?;
    Some(Drive::from_field(workspace.block(first).field_or("BOT", "ACTIVITYBOT")))
}

fn require_drive(g: &mut Generator<'_>, block: &Block) -> Result<Drive, String> {
    configured_drive(g).ok_or_else(|| {
        g.warning(
            block,
            "You must use a Robot initialize block at the beginning of your program!",
        )
    })
}

pub fn init(g: &mut Generator<'_>, block: &Block) -> Output {
    if let Some(line) = duplicate_initializer(g, block, "Robot initialize") {
        return Output::statement(line);
    }
    let drive = Drive::from_field(&g.field(block, "BOT"));
    g.ctx.add_include("robot_drive", drive.header());
    if drive == Drive::ServoDiff {
        let left = g.pin(block, "LEFT");
        let right = g.pin(block, "RIGHT");
        g.ctx
            .add_setup("robot_pins", format!("drive_pins({}, {});", left, right));
    }
    Output::statement("")
}

pub fn goto(g: &mut Generator<'_>, block: &Block) -> Output {
    let drive = match require_drive(g, block) {
        Ok(drive) => drive,
        Err(line) => return Output::statement(line),
    };
    if drive == Drive::ServoDiff {
        let line = g.warning(
            block,
            "The servo differential drive cannot drive a distance; use the drive speed block.",
        );
        return Output::statement(line);
    }
    let left = g.value_or_default(block, "LEFT", Order::None);
    let right = g.value_or_default(block, "RIGHT", Order::None);
    Output::statement(format!("drive_goto({}, {});\n", left, right))
}

pub fn speed(g: &mut Generator<'_>, block: &Block) -> Output {
    let drive = match require_drive(g, block) {
        Ok(drive) => drive,
        Err(line) => return Output::statement(line),
    };
    let top = drive.top_speed();
    let left = g.clamped_value(block, "LEFT", -top, top, Order::None);
    let right = g.clamped_value(block, "RIGHT", -top, top, Order::None);
    Output::statement(format!("{}({}, {});\n", drive.speed_call(), left, right))
}

pub fn stop(g: &mut Generator<'_>, block: &Block) -> Output {
    let drive = match require_drive(g, block) {
        Ok(drive) => drive,
        Err(line) => return Output::statement(line),
    };
    Output::statement(format!("{}(0, 0);\n", drive.speed_call()))
}
