use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Locale
// ---------------------------------------------------------------------------

/// Rendering language for stage, typology and objective labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-br")]
    PtBr,
}

impl Locale {
    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::PtBr => "pt-br",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = crate::error::KwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "pt-br" | "pt_br" | "pt" => Ok(Locale::PtBr),
            other => Err(crate::error::KwError::InvalidConfig(format!(
                "unknown locale '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// JourneyStage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStage {
    Awareness,
    Consideration,
    Decision,
    Loyalty,
    Undefined,
}

impl JourneyStage {
    pub fn all() -> &'static [JourneyStage] {
        &[
            JourneyStage::Awareness,
            JourneyStage::Consideration,
            JourneyStage::Decision,
            JourneyStage::Loyalty,
            JourneyStage::Undefined,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JourneyStage::Awareness => "awareness",
            JourneyStage::Consideration => "consideration",
            JourneyStage::Decision => "decision",
            JourneyStage::Loyalty => "loyalty",
            JourneyStage::Undefined => "undefined",
        }
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (JourneyStage::Awareness, Locale::En) => "Awareness",
            (JourneyStage::Consideration, Locale::En) => "Consideration",
            (JourneyStage::Decision, Locale::En) => "Decision",
            (JourneyStage::Loyalty, Locale::En) => "Loyalty",
            (JourneyStage::Undefined, Locale::En) => "Undefined",
            (JourneyStage::Awareness, Locale::PtBr) => "Conscientização",
            (JourneyStage::Consideration, Locale::PtBr) => "Consideração",
            (JourneyStage::Decision, Locale::PtBr) => "Decisão",
            (JourneyStage::Loyalty, Locale::PtBr) => "Fidelização",
            (JourneyStage::Undefined, Locale::PtBr) => "Sem Jornada Definida",
        }
    }
}

impl fmt::Display for JourneyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Locale::En))
    }
}

// ---------------------------------------------------------------------------
// Typology
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Typology {
    BlogArticle,
    QuickAnswerBlogArticle,
    Guide,
    Infographic,
    Faqs,
    BroadDefinitionBlogArticle,
    IndustryNews,
    ConversionOptimizedPage,
    ProductServicePage,
    Comparison,
    Documentation,
    UpdateBlog,
    SupportPage,
    ManualReview,
}

impl Typology {
    pub fn all() -> &'static [Typology] {
        &[
            Typology::BlogArticle,
            Typology::QuickAnswerBlogArticle,
            Typology::Guide,
            Typology::Infographic,
            Typology::Faqs,
            Typology::BroadDefinitionBlogArticle,
            Typology::IndustryNews,
            Typology::ConversionOptimizedPage,
            Typology::ProductServicePage,
            Typology::Comparison,
            Typology::Documentation,
            Typology::UpdateBlog,
            Typology::SupportPage,
            Typology::ManualReview,
        ]
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => match self {
                Typology::BlogArticle => "Blog Article",
                Typology::QuickAnswerBlogArticle => "Quick-Answer Blog Article",
                Typology::Guide => "Guide",
                Typology::Infographic => "Infographic",
                Typology::Faqs => "FAQs",
                Typology::BroadDefinitionBlogArticle => "Broad-Definition Blog Article",
                Typology::IndustryNews => "Industry News",
                Typology::ConversionOptimizedPage => "Conversion-Optimized Product/Service Page",
                Typology::ProductServicePage => "Product/Service Page",
                Typology::Comparison => "Comparison",
                Typology::Documentation => "Documentation",
                Typology::UpdateBlog => "Update Blog",
                Typology::SupportPage => "Support Page",
                Typology::ManualReview => "Manual Review",
            },
            Locale::PtBr => match self {
                Typology::BlogArticle => "Artigo de Blog",
                Typology::QuickAnswerBlogArticle => "Artigo de Blog (respostas rápidas)",
                Typology::Guide => "Guia",
                Typology::Infographic => "Infográfico",
                Typology::Faqs => "FAQs",
                Typology::BroadDefinitionBlogArticle => "Artigo de Blog (definições amplas)",
                Typology::IndustryNews => "Notícias do Setor",
                Typology::ConversionOptimizedPage => {
                    "Página de Produto/Serviço (otimizadas para conversão)"
                }
                Typology::ProductServicePage => "Página de Produto/Serviço",
                Typology::Comparison => "Comparativo",
                Typology::Documentation => "Documentação",
                Typology::UpdateBlog => "Blog de Atualizações",
                Typology::SupportPage => "Página de Suporte",
                Typology::ManualReview => "Análise Manual",
            },
        }
    }
}

impl fmt::Display for Typology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Locale::En))
    }
}

// ---------------------------------------------------------------------------
// StrategicObjective
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategicObjective {
    LeadCapture,
    EcommerceSales,
    MoreTraffic,
    AdsenseMonetization,
    BrandingAuthority,
    Other,
}

impl StrategicObjective {
    /// Menu order used by the numeric selector (1-based).
    pub fn all() -> &'static [StrategicObjective] {
        &[
            StrategicObjective::LeadCapture,
            StrategicObjective::EcommerceSales,
            StrategicObjective::MoreTraffic,
            StrategicObjective::AdsenseMonetization,
            StrategicObjective::BrandingAuthority,
            StrategicObjective::Other,
        ]
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => match self {
                StrategicObjective::LeadCapture => "Lead Capture",
                StrategicObjective::EcommerceSales => "E-commerce Sales",
                StrategicObjective::MoreTraffic => "More Traffic",
                StrategicObjective::AdsenseMonetization => "AdSense Monetization",
                StrategicObjective::BrandingAuthority => "Branding/Authority",
                StrategicObjective::Other => "Other",
            },
            Locale::PtBr => match self {
                StrategicObjective::LeadCapture => "Captura de leads",
                StrategicObjective::EcommerceSales => "Vendas no e-commerce",
                StrategicObjective::MoreTraffic => "Mais acessos",
                StrategicObjective::AdsenseMonetization => "Monetização com Adsense",
                StrategicObjective::BrandingAuthority => "Branding/Autoridade",
                StrategicObjective::Other => "Outro",
            },
        }
    }
}

impl fmt::Display for StrategicObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Locale::En))
    }
}

/// The analyst's stated goal for the run: a menu entry or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveSelection {
    Known(StrategicObjective),
    Custom(String),
}

impl ObjectiveSelection {
    /// Accepts `1`..`6`, an English or Portuguese label (any case), or free text.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if let Ok(n) = trimmed.parse::<usize>() {
            if let Some(obj) = n.checked_sub(1).and_then(|i| StrategicObjective::all().get(i)) {
                return ObjectiveSelection::Known(*obj);
            }
        }
        let lower = trimmed.to_lowercase();
        for obj in StrategicObjective::all() {
            if [Locale::En, Locale::PtBr]
                .iter()
                .any(|l| obj.label(*l).to_lowercase() == lower)
            {
                return ObjectiveSelection::Known(*obj);
            }
        }
        ObjectiveSelection::Custom(trimmed.to_string())
    }

    pub fn known(&self) -> Option<StrategicObjective> {
        match self {
            ObjectiveSelection::Known(obj) => Some(*obj),
            ObjectiveSelection::Custom(_) => None,
        }
    }

    pub fn label(&self, locale: Locale) -> String {
        match self {
            ObjectiveSelection::Known(obj) => obj.label(locale).to_string(),
            ObjectiveSelection::Custom(text) => text.clone(),
        }
    }
}

impl Default for ObjectiveSelection {
    fn default() -> Self {
        ObjectiveSelection::Known(StrategicObjective::MoreTraffic)
    }
}

// ---------------------------------------------------------------------------
// TailLength
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailLength {
    Short,
    Medium,
    Long,
}

impl TailLength {
    pub fn all() -> &'static [TailLength] {
        &[TailLength::Short, TailLength::Medium, TailLength::Long]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TailLength::Short => "short tail",
            TailLength::Medium => "medium tail",
            TailLength::Long => "long tail",
        }
    }
}

impl fmt::Display for TailLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// KeywordRecord
// ---------------------------------------------------------------------------

/// One merged input row plus the columns derived by later stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serp_features: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitive_density: Option<f64>,
    /// Passthrough columns in input header order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journey_stage: Option<JourneyStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typology: Option<Typology>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<StrategicObjective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<TailLength>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_group: Option<String>,
}

impl KeywordRecord {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Default::default()
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn with_serp(mut self, serp: impl Into<String>) -> Self {
        self.serp_features = Some(serp.into());
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.competitive_density = Some(density);
        self
    }

    pub fn intent_str(&self) -> &str {
        self.intent.as_deref().unwrap_or("")
    }

    pub fn serp_str(&self) -> &str {
        self.serp_features.as_deref().unwrap_or("")
    }

    /// Distinct, trimmed, non-empty SERP feature tokens.
    pub fn serp_tokens(&self) -> BTreeSet<&str> {
        self.serp_str()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
