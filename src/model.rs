//! Studio data model: the form, generation steps, jobs and the persisted document.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One of the fixed image-generation intents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Module {
    /// Click-focused ad cover.
    #[serde(rename = "CAPA_ANUNCIO")]
    CoverAd,
    /// Promotional infographic.
    #[serde(rename = "INFOGRAFICO_PROMOCIONAL")]
    PromoInfographic,
    /// White-background studio shot.
    #[serde(rename = "FUNDO_BRANCO_ML")]
    WhiteBackground,
    /// Product worn in a lifestyle scene.
    #[serde(rename = "FOTO_NO_PE_LIFESTYLE")]
    Lifestyle,
}

impl Module {
    /// The product code, as substituted into prompts.
    pub fn code(self) -> &'static str {
        match self {
            Self::CoverAd => "CAPA_ANUNCIO",
            Self::PromoInfographic => "INFOGRAFICO_PROMOCIONAL",
            Self::WhiteBackground => "FUNDO_BRANCO_ML",
            Self::Lifestyle => "FOTO_NO_PE_LIFESTYLE",
        }
    }
}

/// Camera angle for the studio module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Angle {
    #[serde(rename = "FRONT_45_CAPA")]
    /// Front, 45 degrees.
    Front45,
    #[serde(rename = "LATERAL_PERFIL")]
    /// Side profile.
    SideProfile,
    #[serde(rename = "TOP_DOWN")]
    /// Top down.
    TopDown,
    #[serde(rename = "TRASEIRA")]
    /// Back.
    Back,
    #[serde(rename = "SOLADO_MACRO")]
    /// Sole macro.
    SoleMacro,
    #[serde(rename = "PERSPECTIVA_3_4_PREMIUM")]
    /// Premium three-quarter perspective.
    ThreeQuarter,
}

impl Angle {
    /// The product code, as substituted into prompts.
    pub fn code(self) -> &'static str {
        match self {
            Self::Front45 => "FRONT_45_CAPA",
            Self::SideProfile => "LATERAL_PERFIL",
            Self::TopDown => "TOP_DOWN",
            Self::Back => "TRASEIRA",
            Self::SoleMacro => "SOLADO_MACRO",
            Self::ThreeQuarter => "PERSPECTIVA_3_4_PREMIUM",
        }
    }
}

/// Framing for the lifestyle module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Framing {
    #[serde(rename = "JOELHO_PRA_BAIXO")]
    /// Knee down.
    KneeDown,
    #[serde(rename = "PESCOCO_PRA_BAIXO")]
    /// Neck down.
    NeckDown,
}

impl Framing {
    /// The product code, as substituted into prompts.
    pub fn code(self) -> &'static str {
        match self {
            Self::KneeDown => "JOELHO_PRA_BAIXO",
            Self::NeckDown => "PESCOCO_PRA_BAIXO",
        }
    }
}

/// Scene for the lifestyle module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scene {
    #[serde(rename = "URBANO_MINIMAL")]
    /// Minimal urban.
    UrbanMinimal,
    #[serde(rename = "ACADEMIA_REAL")]
    /// Real gym.
    Gym,
    #[serde(rename = "STREET_SKT")]
    /// Street / skate.
    StreetSkate,
    #[serde(rename = "CASUAL_TRABALHO")]
    /// Casual work.
    CasualWork,
    #[serde(rename = "FASHION_FEMININO")]
    /// Women's fashion.
    WomensFashion,
}

impl Scene {
    /// The product code, as substituted into prompts.
    pub fn code(self) -> &'static str {
        match self {
            Self::UrbanMinimal => "URBANO_MINIMAL",
            Self::Gym => "ACADEMIA_REAL",
            Self::StreetSkate => "STREET_SKT",
            Self::CasualWork => "CASUAL_TRABALHO",
            Self::WomensFashion => "FASHION_FEMININO",
        }
    }
}

/// A module invocation with the selectors that module understands.
///
/// Missing selectors fall back to the form's global values when the prompt is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "module")]
pub enum ModuleStep {
    /// Ad cover, no selectors.
    #[serde(rename = "CAPA_ANUNCIO")]
    CoverAd,
    /// Infographic, no selectors.
    #[serde(rename = "INFOGRAFICO_PROMOCIONAL")]
    PromoInfographic,
    /// Studio shot at an angle.
    #[serde(rename = "FUNDO_BRANCO_ML")]
    WhiteBackground {
        /// Angle override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        angle: Option<Angle>,
    },
    /// Lifestyle shot with framing and scene.
    #[serde(rename = "FOTO_NO_PE_LIFESTYLE")]
    Lifestyle {
        /// Framing override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        framing: Option<Framing>,
        /// Scene override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scene: Option<Scene>,
    },
}

impl ModuleStep {
    /// The module this step renders.
    pub fn module(&self) -> Module {
        match self {
            Self::CoverAd => Module::CoverAd,
            Self::PromoInfographic => Module::PromoInfographic,
            Self::WhiteBackground { .. } => Module::WhiteBackground,
            Self::Lifestyle { .. } => Module::Lifestyle,
        }
    }
}

/// One unit of execution inside a job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStep {
    /// Step id, unique within its job.
    pub id: String,
    /// Module and selectors.
    #[serde(flatten)]
    pub step: ModuleStep,
}

impl GenerationStep {
    /// Builds a step.
    pub fn new(id: impl Into<String>, step: ModuleStep) -> Self {
        Self {
            id: id.into(),
            step,
        }
    }

    /// The module this step renders.
    pub fn module(&self) -> Module {
        self.step.module()
    }
}

/// Named step bundles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresetKey {
    /// Shopee package: cover, infographic, lifestyle.
    #[serde(rename = "PACOTE_SHOPEE_PADRAO")]
    ShopeeStandard,
    /// Mercado Livre package: cover, infographic, two studio angles.
    #[serde(rename = "PACOTE_ML_PADRAO")]
    MercadoLivreStandard,
    /// Three cover variations.
    #[serde(rename = "PACOTE_3_CAPAS")]
    ThreeCovers,
    /// All six studio angles.
    #[serde(rename = "SO_FUNDO_BRANCO_ANGULOS")]
    AllWhiteBackgroundAngles,
    /// One step built from the live form.
    #[serde(rename = "CUSTOM")]
    Custom,
}

/// A product photo attached to the form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    /// Image id.
    pub id: String,
    /// Original file name.
    pub name: String,
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
}

/// Everything the seller fills in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    /// Niche or style.
    pub niche_style: String,
    /// Product category.
    pub category: String,
    /// Main use.
    pub main_use: String,
    /// Sizes or measurements.
    pub sizes: String,
    /// Available colors.
    pub colors: String,
    /// Model name.
    pub model_name: String,
    /// Benefits.
    pub benefits: String,
    /// Extra detail.
    pub extra_detail: String,
    /// Restrictions, which take priority in the prompt.
    pub restrictions: String,

    /// Attached product photos, in order.
    pub product_images: Vec<ProductImage>,

    /// Module used by the CUSTOM preset.
    pub module: Module,
    /// Global angle selector.
    pub angle: Angle,
    /// Global framing selector.
    pub framing: Framing,
    /// Global scene selector.
    pub scene: Scene,

    /// Append the negative block.
    pub negative_block_on: bool,
    /// Append the mobile legibility reminder.
    pub mobile_legibility_on: bool,

    /// Selected preset.
    pub preset: PresetKey,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            niche_style: "street/skate".to_string(),
            category: "tênis".to_string(),
            main_use: "dia a dia".to_string(),
            sizes: "34–43".to_string(),
            colors: "preto, branco".to_string(),
            model_name: String::new(),
            benefits: "conforto, leveza, durabilidade".to_string(),
            extra_detail: String::new(),
            restrictions: String::new(),
            product_images: Vec::new(),
            module: Module::CoverAd,
            angle: Angle::Front45,
            framing: Framing::KneeDown,
            scene: Scene::UrbanMinimal,
            negative_block_on: true,
            mobile_legibility_on: true,
            preset: PresetKey::ShopeeStandard,
        }
    }
}

/// Lifecycle of a job; it only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting for the runner.
    Queued,
    /// Being executed.
    Running,
    /// Every step produced a result.
    Done,
    /// Aborted; partial results are discarded.
    Error,
}

impl JobStatus {
    /// Whether `self -> next` is a legal transition.
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Running)
                | (Self::Queued, Self::Error)
                | (Self::Running, Self::Done)
                | (Self::Running, Self::Error)
        )
    }
}

/// Output of one step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Step this result belongs to.
    pub step_id: String,
    /// Module of that step.
    pub module: Module,
    /// The fully expanded prompt.
    pub prompt: String,
    /// Random seed picked for the step.
    pub seed: u32,
    /// Creation time, ms since the epoch.
    pub created_at: i64,
    /// The produced image as a data URL.
    pub image_data_url: String,
}

/// A queued batch of steps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Job id.
    pub id: String,
    /// Creation time, ms since the epoch.
    pub created_at: i64,
    /// Display name.
    pub name: String,
    /// Current status.
    pub status: JobStatus,
    /// Steps snapshotted at enqueue time.
    pub steps: Vec<GenerationStep>,
    /// Results, in step order.
    #[serde(default)]
    pub results: Vec<GenerationResult>,
    /// Failure message when `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Moves the job to `next`, refusing backwards or sideways moves.
    pub fn advance(&mut self, next: JobStatus) -> Result<(), crate::error::StudioError> {
        if !self.status.can_advance_to(next) {
            return Err(crate::error::StudioError::InternalServerError(format!(
                "job {} cannot move from {:?} to {:?}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    /// Case-insensitive match on name, id or any result module.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self.id.to_lowercase().contains(&query)
            || self
                .results
                .iter()
                .any(|result| result.module.code().to_lowercase().contains(&query))
    }
}

/// The single persisted aggregate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    /// The form.
    pub form: FormState,
    /// Jobs, newest first.
    pub jobs: Vec<Job>,
}

/// Job counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct JobStats {
    /// All jobs.
    pub total: usize,
    /// Finished jobs.
    pub done: usize,
    /// Running jobs.
    pub running: usize,
    /// Queued jobs.
    pub queued: usize,
}

impl PersistedState {
    /// Counts jobs by status.
    pub fn stats(&self) -> JobStats {
        let count = |status| self.jobs.iter().filter(|job| job.status == status).count();
        JobStats {
            total: self.jobs.len(),
            done: count(JobStatus::Done),
            running: count(JobStatus::Running),
            queued: count(JobStatus::Queued),
        }
    }

    /// The oldest queued job, by creation order.
    pub fn next_queued(&self) -> Option<&Job> {
        self.jobs
            .iter()
            .rev()
            .find(|job| job.status == JobStatus::Queued)
    }

    /// Looks up a job by id.
    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    /// Looks up a job by id, mutably.
    pub fn job_mut(&mut self, id: &str) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|job| job.id == id)
    }
}

/// `"{prefix}_{random hex}_{time hex}"`
pub fn new_id(prefix: &str) -> String {
    format!(
        "{prefix}_{:x}_{:x}",
        rand::random::<u64>(),
        now_millis()
    )
}

/// Milliseconds since the epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
