//! Prompt templating.
//!
//! A prompt is the master block followed by the module block, both with their
//! `{VAR}` placeholders substituted from the form and step, plus the optional
//! mobile legibility reminder and negative block.

pub mod templates;

use crate::model::{FormState, GenerationStep, Module, ModuleStep};

const NOT_INFORMED: &str = "(não informado)";
const NO_RESTRICTIONS: &str = "(nenhuma)";

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// Template for a module.
pub fn module_template(module: Module) -> &'static str {
    match module {
        Module::CoverAd => templates::COVER_AD,
        Module::PromoInfographic => templates::PROMO_INFOGRAPHIC,
        Module::WhiteBackground => templates::WHITE_BACKGROUND,
        Module::Lifestyle => templates::LIFESTYLE,
    }
}

/// Variables for `step`, in substitution order.
///
/// Selector values come from the step when it carries them, else from the form.
pub fn variables(step: &GenerationStep, form: &FormState) -> Vec<(&'static str, String)> {
    let (angle, framing, scene) = match step.step {
        ModuleStep::WhiteBackground { angle } => (angle, None, None),
        ModuleStep::Lifestyle { framing, scene } => (None, framing, scene),
        ModuleStep::CoverAd | ModuleStep::PromoInfographic => (None, None, None),
    };

    vec![
        ("MODULO", step.module().code().to_string()),
        ("NICHO_ESTILO", or_placeholder(&form.niche_style, NOT_INFORMED)),
        ("CATEGORIA", or_placeholder(&form.category, NOT_INFORMED)),
        ("USO", or_placeholder(&form.main_use, NOT_INFORMED)),
        ("TAMANHOS", or_placeholder(&form.sizes, NOT_INFORMED)),
        ("CORES", or_placeholder(&form.colors, NOT_INFORMED)),
        ("NOME_MODELO", or_placeholder(&form.model_name, NOT_INFORMED)),
        ("BENEFICIOS", or_placeholder(&form.benefits, NOT_INFORMED)),
        ("DETALHE_EXTRA", or_placeholder(&form.extra_detail, NOT_INFORMED)),
        ("RESTRICOES", or_placeholder(&form.restrictions, NO_RESTRICTIONS)),
        ("ANGULO_ML", angle.unwrap_or(form.angle).code().to_string()),
        (
            "ENQUADRAMENTO",
            framing.unwrap_or(form.framing).code().to_string(),
        ),
        (
            "CENARIO_LIFESTYLE",
            scene.unwrap_or(form.scene).code().to_string(),
        ),
    ]
}

/// Replaces every `{NAME}` with its value, one variable at a time, in order.
///
/// Values are inserted literally. Placeholders with no variable stay in the output.
pub fn apply_vars(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

/// Builds the full prompt for one step.
pub fn build_prompt(step: &GenerationStep, form: &FormState) -> String {
    let vars = variables(step, form);
    let master = apply_vars(templates::MASTER, &vars);
    let module = apply_vars(module_template(step.module()), &vars);

    let mut prompt = String::with_capacity(master.len() + module.len() + 1024);
    prompt.push_str(&master);
    prompt.push_str(templates::SEPARATOR);
    prompt.push_str(&module);
    if form.mobile_legibility_on {
        prompt.push_str("\n\n");
        prompt.push_str(templates::MOBILE_LEGIBILITY);
    }
    if form.negative_block_on {
        prompt.push_str(templates::SEPARATOR);
        prompt.push_str(templates::NEGATIVE_BLOCK);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Angle, Framing, Scene};
    use crate::presets;

    fn all_steps() -> Vec<GenerationStep> {
        vec![
            GenerationStep::new("a", ModuleStep::CoverAd),
            GenerationStep::new("b", ModuleStep::PromoInfographic),
            GenerationStep::new("c", ModuleStep::WhiteBackground { angle: None }),
            GenerationStep::new(
                "d",
                ModuleStep::Lifestyle {
                    framing: None,
                    scene: None,
                },
            ),
        ]
    }

    #[test]
    fn master_precedes_module_and_placeholders_resolve() {
        let form = FormState {
            model_name: "Runner X".into(),
            extra_detail: "costura dupla".into(),
            restrictions: "sem vermelho".into(),
            ..FormState::default()
        };
        for step in all_steps() {
            let prompt = build_prompt(&step, &form);
            assert!(prompt.starts_with("MASTER ROUTER"));
            let master_end = prompt.find(templates::SEPARATOR).expect("separator");
            let module_block = &prompt[master_end + templates::SEPARATOR.len()..];
            assert!(module_block.starts_with(step.module().code()));
            assert!(!prompt.contains('{'), "unresolved placeholder in {}", step.id);
            assert!(prompt.contains("Nome do modelo: Runner X"));
            assert!(prompt.contains("Restrições: sem vermelho"));
        }
    }

    #[test]
    fn empty_fields_use_placeholders() {
        let form = FormState {
            category: String::new(),
            restrictions: String::new(),
            ..FormState::default()
        };
        let prompt = build_prompt(&GenerationStep::new("a", ModuleStep::CoverAd), &form);
        assert!(prompt.contains("Categoria: (não informado)"));
        assert!(prompt.contains("Restrições: (nenhuma)"));
    }

    #[test]
    fn toggles_remove_exactly_their_blocks() {
        let step = GenerationStep::new("a", ModuleStep::PromoInfographic);
        let form = |mobile, negative| FormState {
            mobile_legibility_on: mobile,
            negative_block_on: negative,
            ..FormState::default()
        };

        let none = build_prompt(&step, &form(false, false));
        let mobile = build_prompt(&step, &form(true, false));
        let negative = build_prompt(&step, &form(false, true));
        let both = build_prompt(&step, &form(true, true));

        assert_eq!(
            mobile,
            format!("{none}\n\n{}", templates::MOBILE_LEGIBILITY)
        );
        assert_eq!(
            negative,
            format!("{none}{}{}", templates::SEPARATOR, templates::NEGATIVE_BLOCK)
        );
        assert_eq!(
            both,
            format!(
                "{none}\n\n{}{}{}",
                templates::MOBILE_LEGIBILITY,
                templates::SEPARATOR,
                templates::NEGATIVE_BLOCK
            )
        );
        assert_eq!(both, build_prompt(&step, &form(true, true)));
    }

    #[test]
    fn step_selectors_override_form_selectors() {
        let form = FormState {
            angle: Angle::Front45,
            framing: Framing::KneeDown,
            scene: Scene::UrbanMinimal,
            ..FormState::default()
        };
        let studio = GenerationStep::new(
            "s",
            ModuleStep::WhiteBackground {
                angle: Some(Angle::SoleMacro),
            },
        );
        assert!(build_prompt(&studio, &form).contains("Seletor de Ângulo: SOLADO_MACRO"));

        let fallback = GenerationStep::new("s", ModuleStep::WhiteBackground { angle: None });
        assert!(build_prompt(&fallback, &form).contains("Seletor de Ângulo: FRONT_45_CAPA"));

        let lifestyle = GenerationStep::new(
            "l",
            ModuleStep::Lifestyle {
                framing: Some(Framing::NeckDown),
                scene: None,
            },
        );
        let prompt = build_prompt(&lifestyle, &form);
        assert!(prompt.contains("Enquadramento: PESCOCO_PRA_BAIXO"));
        assert!(prompt.contains("Cenário: URBANO_MINIMAL"));
    }

    #[test]
    fn substitution_is_literal_and_ordered() {
        // CATEGORIA is replaced before USO, so a value that spells a later
        // placeholder is expanded by that later pass.
        let vars = vec![
            ("CATEGORIA", "{USO}".to_string()),
            ("USO", "corrida".to_string()),
        ];
        assert_eq!(apply_vars("{CATEGORIA}/{USO}", &vars), "corrida/corrida");
        assert_eq!(apply_vars("{DESCONHECIDO}", &vars), "{DESCONHECIDO}");
        assert_eq!(apply_vars("$1 {USO}", &vars), "$1 corrida");
    }

    #[test]
    fn preset_prompts_are_deterministic() {
        let form = FormState::default();
        for step in presets::derived_steps(&form) {
            assert_eq!(build_prompt(&step, &form), build_prompt(&step, &form));
        }
    }
}
