//! Effect listing and information command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use serde::Serialize;
use vibra_core::{ParamDescriptor, ParamFlags};
use vibra_registry::{EffectDescriptor, EffectRegistry};

#[derive(Args)]
pub struct EffectsArgs {
    /// Show details for a specific effect
    #[arg(value_name = "EFFECT")]
    effect: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ParamInfo {
    index: usize,
    name: &'static str,
    label: &'static str,
    min: f32,
    max: f32,
    default: f32,
    unit: &'static str,
    stepped: bool,
}

#[derive(Serialize)]
struct EffectInfo {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    description: &'static str,
    params: Vec<ParamInfo>,
}

impl From<&EffectDescriptor> for EffectInfo {
    fn from(effect: &EffectDescriptor) -> Self {
        Self {
            id: effect.id,
            name: effect.name,
            category: effect.category.name(),
            description: effect.description,
            params: effect
                .params
                .iter()
                .enumerate()
                .map(|(index, d)| ParamInfo {
                    index,
                    name: d.name,
                    label: d.short_name,
                    min: d.min,
                    max: d.max,
                    default: d.default,
                    unit: d.unit.suffix().trim(),
                    stepped: d.flags.contains(ParamFlags::STEPPED),
                })
                .collect(),
        }
    }
}

fn format_value(d: &ParamDescriptor, value: f32) -> String {
    if d.flags.contains(ParamFlags::STEPPED) {
        format!("{value:.0}{}", d.unit.suffix())
    } else {
        format!("{value:.3}{}", d.unit.suffix())
    }
}

pub fn run(args: EffectsArgs) -> anyhow::Result<()> {
    let registry = EffectRegistry::new();

    if let Some(effect_name) = &args.effect {
        let effect = registry
            .get(effect_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown effect: {}", effect_name))?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&EffectInfo::from(effect))?);
            return Ok(());
        }

        println!("{} ({})", effect.name, effect.id);
        println!("{}", "=".repeat(effect.name.len() + effect.id.len() + 3));
        println!();
        println!("{}", effect.description);
        println!("Category: {}", effect.category.name());
        println!();

        println!("Parameters (state order):");
        println!();
        println!(
            "  {:3}  {:12}  {:10}  {:14}  {}",
            "#", "Name", "Label", "Default", "Range"
        );
        println!(
            "  {:3}  {:12}  {:10}  {:14}  {}",
            "-", "----", "-----", "-------", "-----"
        );
        for (i, d) in effect.params.iter().enumerate() {
            println!(
                "  {:3}  {:12}  {:10}  {:14}  {} .. {}",
                i,
                d.name,
                d.short_name,
                format_value(d, d.default),
                format_value(d, d.min),
                format_value(d, d.max)
            );
        }

        println!();
        println!("Example usage:");
        println!();
        let params: Vec<String> = effect
            .params
            .iter()
            .take(2)
            .map(|d| format!("{}={}", d.name, d.default))
            .collect();
        println!(
            "  vibra process input.wav output.wav --effect {} --param {}",
            effect.id,
            params.join(" --param ")
        );
    } else {
        if args.json {
            let all: Vec<EffectInfo> = registry.all_effects().into_iter().map(EffectInfo::from).collect();
            println!("{}", serde_json::to_string_pretty(&all)?);
            return Ok(());
        }

        println!("Available Effects");
        println!("=================");
        println!();

        for effect in registry.all_effects() {
            println!(
                "  {:12} {:12} - {}",
                effect.id,
                format!("[{}]", effect.category.name()),
                effect.description
            );
        }

        println!();
        println!("Use 'vibra effects <id>' for detailed parameter info.");
    }

    Ok(())
}
