//! Fixed step bundles for common marketplace submissions.

use serde::Serialize;

use crate::model::{
    Angle, FormState, Framing, GenerationStep, Module, ModuleStep, PresetKey, Scene,
};

/// A named bundle of steps.
#[derive(Clone, Debug, Serialize)]
pub struct Preset {
    /// Preset key.
    pub key: PresetKey,
    /// Display name.
    pub name: &'static str,
    /// One-line hint.
    pub hint: &'static str,
    /// Steps, in execution order.
    pub steps: Vec<GenerationStep>,
}

/// Every static preset; CUSTOM is derived from the form instead.
pub const STATIC_PRESETS: [PresetKey; 4] = [
    PresetKey::ShopeeStandard,
    PresetKey::MercadoLivreStandard,
    PresetKey::ThreeCovers,
    PresetKey::AllWhiteBackgroundAngles,
];

fn studio(id: &str, angle: Angle) -> GenerationStep {
    GenerationStep::new(id, ModuleStep::WhiteBackground { angle: Some(angle) })
}

/// Returns the static preset for `key`, or `None` for CUSTOM.
pub fn preset(key: PresetKey) -> Option<Preset> {
    let preset = match key {
        PresetKey::ShopeeStandard => Preset {
            key,
            name: "Pacote Shopee (Capa + Info + Lifestyle)",
            hint: "1 clique → 3 artes (capa, infográfico, foto no pé).",
            steps: vec![
                GenerationStep::new("s1", ModuleStep::CoverAd),
                GenerationStep::new("s2", ModuleStep::PromoInfographic),
                GenerationStep::new(
                    "s3",
                    ModuleStep::Lifestyle {
                        framing: Some(Framing::KneeDown),
                        scene: Some(Scene::UrbanMinimal),
                    },
                ),
            ],
        },
        PresetKey::MercadoLivreStandard => Preset {
            key,
            name: "Pacote Mercado Livre (Capa + 2x Fundo Branco + Info)",
            hint: "ML costuma pedir mais ângulos de estúdio.",
            steps: vec![
                GenerationStep::new("s1", ModuleStep::CoverAd),
                GenerationStep::new("s2", ModuleStep::PromoInfographic),
                studio("s3", Angle::Front45),
                studio("s4", Angle::SideProfile),
            ],
        },
        PresetKey::ThreeCovers => Preset {
            key,
            name: "3 Capas (variações de impacto)",
            hint: "Para testar criativos rapidamente.",
            steps: vec![
                GenerationStep::new("s1", ModuleStep::CoverAd),
                GenerationStep::new("s2", ModuleStep::CoverAd),
                GenerationStep::new("s3", ModuleStep::CoverAd),
            ],
        },
        PresetKey::AllWhiteBackgroundAngles => Preset {
            key,
            name: "Fundo Branco (todos ângulos)",
            hint: "Gera 6 imagens: padrão ML completo.",
            steps: vec![
                studio("s1", Angle::Front45),
                studio("s2", Angle::SideProfile),
                studio("s3", Angle::TopDown),
                studio("s4", Angle::Back),
                studio("s5", Angle::SoleMacro),
                studio("s6", Angle::ThreeQuarter),
            ],
        },
        PresetKey::Custom => return None,
    };
    Some(preset)
}

/// The single step CUSTOM synthesizes from the live form.
pub fn custom_step(form: &FormState) -> GenerationStep {
    let step = match form.module {
        Module::CoverAd => ModuleStep::CoverAd,
        Module::PromoInfographic => ModuleStep::PromoInfographic,
        Module::WhiteBackground => ModuleStep::WhiteBackground {
            angle: Some(form.angle),
        },
        Module::Lifestyle => ModuleStep::Lifestyle {
            framing: Some(form.framing),
            scene: Some(form.scene),
        },
    };
    GenerationStep::new("custom_step", step)
}

/// Steps the current form would enqueue.
pub fn derived_steps(form: &FormState) -> Vec<GenerationStep> {
    match preset(form.preset) {
        Some(preset) => preset.steps,
        None => vec![custom_step(form)],
    }
}

/// Display label used in job names: the preset name, or the module code for CUSTOM.
pub fn label(form: &FormState) -> String {
    match preset(form.preset) {
        Some(preset) => preset.name.to_string(),
        None => form.module.code().to_string(),
    }
}

/// Static presets followed by the live CUSTOM bundle.
pub fn all(form: &FormState) -> Vec<Preset> {
    let mut presets: Vec<Preset> = STATIC_PRESETS.iter().filter_map(|key| preset(*key)).collect();
    presets.push(Preset {
        key: PresetKey::Custom,
        name: "Custom",
        hint: "1 arte com o módulo e seletores atuais.",
        steps: vec![custom_step(form)],
    });
    presets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_covers_is_three_cover_steps() {
        let preset = preset(PresetKey::ThreeCovers).expect("static preset");
        assert_eq!(preset.steps.len(), 3);
        assert!(preset.steps.iter().all(|s| s.module() == Module::CoverAd));
    }

    #[test]
    fn all_angles_covers_every_angle_once() {
        let preset = preset(PresetKey::AllWhiteBackgroundAngles).expect("static preset");
        let angles: Vec<Angle> = preset
            .steps
            .iter()
            .filter_map(|s| match s.step {
                ModuleStep::WhiteBackground { angle } => angle,
                _ => None,
            })
            .collect();
        assert_eq!(
            angles,
            vec![
                Angle::Front45,
                Angle::SideProfile,
                Angle::TopDown,
                Angle::Back,
                Angle::SoleMacro,
                Angle::ThreeQuarter
            ]
        );
    }

    #[test]
    fn custom_only_fills_selectors_of_its_module() {
        let mut form = FormState {
            preset: PresetKey::Custom,
            module: Module::CoverAd,
            angle: Angle::TopDown,
            ..FormState::default()
        };
        assert_eq!(derived_steps(&form), vec![GenerationStep::new("custom_step", ModuleStep::CoverAd)]);

        form.module = Module::WhiteBackground;
        assert_eq!(
            derived_steps(&form)[0].step,
            ModuleStep::WhiteBackground {
                angle: Some(Angle::TopDown)
            }
        );

        form.module = Module::Lifestyle;
        form.scene = Scene::Gym;
        assert_eq!(
            derived_steps(&form)[0].step,
            ModuleStep::Lifestyle {
                framing: Some(Framing::KneeDown),
                scene: Some(Scene::Gym)
            }
        );
        assert_eq!(label(&form), "FOTO_NO_PE_LIFESTYLE");
    }

    #[test]
    fn listing_ends_with_custom() {
        let presets = all(&FormState::default());
        assert_eq!(presets.len(), 5);
        assert_eq!(presets[4].key, PresetKey::Custom);
    }
}
