//! Renders a lowered module as readable text, colored for terminals. The
//! driver strips the colors before writing the plain `.ir` artifact.

use colored::Colorize;

use crate::index::Index;

use super::{Function, Instruction, Module, TempId, Terminator, Value};

pub fn pretty_print_module(module: &Module) -> String {
    let mut output = String::new();

    for class in &module.classes {
        output.push_str(&format!("{} {}", "class".magenta(), class.name.blue()));
        if let Some(base) = &class.base {
            output.push_str(&format!(" : {}", base.blue()));
        }
        output.push('\n');
    }
    if !module.classes.is_empty() {
        output.push('\n');
    }

    for function in &module.functions {
        output.push_str(&pretty_print_function(function));
        output.push('\n');
    }

    for (id, text) in module.strings.enumerate() {
        output.push_str(&format!(
            "{} = {}\n",
            id.label().green(),
            format!("{text:?}").green()
        ));
    }

    output
}

pub fn pretty_print_function(function: &Function) -> String {
    let mut output = String::new();

    let parameters = function
        .parameters
        .iter()
        .map(|parameter| function.slot_name(*parameter).blue().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    output.push_str(&format!(
        "{} {}({}) {{\n",
        "fn".magenta(),
        function.name.blue(),
        parameters
    ));

    for block in function.blocks.iter() {
        output.push_str(&format!("{}\n", format!("{}:", block.label).bright_red()));

        for instruction in &block.instructions {
            output.push_str(&format!(
                "    {}\n",
                render_instruction(function, instruction)
            ));
        }

        if let Some(terminator) = &block.terminator {
            output.push_str(&format!(
                "    {}\n",
                render_terminator(function, terminator)
            ));
        }
    }

    output.push_str("}\n");
    output
}

fn render_instruction(function: &Function, instruction: &Instruction) -> String {
    match instruction {
        Instruction::Binary {
            op,
            destination,
            lhs,
            rhs,
        } => format!(
            "{} {} {} {}, {}",
            render_temp(*destination),
            "=".white(),
            op.mnemonic().cyan(),
            render_value(function, *lhs),
            render_value(function, *rhs),
        ),
        Instruction::Compare {
            predicate,
            destination,
            lhs,
            rhs,
        } => format!(
            "{} {} {} {} {}, {}",
            render_temp(*destination),
            "=".white(),
            "icmp".cyan(),
            predicate.name().cyan(),
            render_value(function, *lhs),
            render_value(function, *rhs),
        ),
        Instruction::Call {
            callee,
            arguments,
            destination,
        } => {
            let arguments = arguments
                .iter()
                .map(|argument| render_value(function, *argument))
                .collect::<Vec<_>>()
                .join(", ");

            match destination {
                Some(destination) => format!(
                    "{} {} {} {}({})",
                    render_temp(*destination),
                    "=".white(),
                    "call".cyan(),
                    callee.blue(),
                    arguments
                ),
                None => format!("{} {}({})", "call".cyan(), callee.blue(), arguments),
            }
        }
        Instruction::Alloc { slot } => format!(
            "{} {}",
            "alloca".cyan(),
            function.slot_name(*slot).blue()
        ),
        Instruction::Load { destination, slot } => format!(
            "{} {} {} {}",
            render_temp(*destination),
            "=".white(),
            "load".cyan(),
            function.slot_name(*slot).blue()
        ),
        Instruction::Store { slot, value } => format!(
            "{} {}, {}",
            "store".cyan(),
            render_value(function, *value),
            function.slot_name(*slot).blue()
        ),
    }
}

fn render_terminator(function: &Function, terminator: &Terminator) -> String {
    match terminator {
        Terminator::Jump { target } => format!(
            "{} {}",
            "jmp".cyan(),
            function.blocks[*target].label.bright_red()
        ),
        Terminator::Branch {
            condition,
            positive,
            negative,
        } => format!(
            "{} {}, {}, {}",
            "br".cyan(),
            render_value(function, *condition),
            function.blocks[*positive].label.bright_red(),
            function.blocks[*negative].label.bright_red()
        ),
        Terminator::Return { value } => {
            format!("{} {}", "ret".cyan(), render_value(function, *value))
        }
    }
}

fn render_value(function: &Function, value: Value) -> String {
    match value {
        Value::Const(value) => value.to_string().yellow().to_string(),
        Value::Str(id) => id.label().green().to_string(),
        Value::Slot(slot) => function.slot_name(slot).blue().to_string(),
        Value::Temp(temp) => render_temp(temp),
    }
}

fn render_temp(temp: TempId) -> String {
    format!("%t{}", temp.index()).magenta().to_string()
}
