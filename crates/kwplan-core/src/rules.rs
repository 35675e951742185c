use crate::taxonomy::{RuleTable, TypologyRule};
use crate::types::Typology;

// ---------------------------------------------------------------------------
// Helper macro for concise rule definitions
// ---------------------------------------------------------------------------

macro_rules! rule {
    ($id:expr, [$($term:expr),+ $(,)?] => $typology:expr) => {
        TypologyRule {
            id: $id,
            any_of: &[$($term),+],
            typology: $typology,
        }
    };
}

// ---------------------------------------------------------------------------
// Default rule tables (priority-ordered within each intent)
// ---------------------------------------------------------------------------

pub fn informational_rules() -> RuleTable {
    RuleTable {
        intents: &["informational"],
        rules: vec![
            rule!("featured_snippet", ["featured snippets"] => Typology::BlogArticle),
            rule!("instant_answer", ["instant answer"] => Typology::QuickAnswerBlogArticle),
            rule!("video", ["video", "featured video", "video carousel"] => Typology::Guide),
            rule!("image", ["image", "image pack"] => Typology::Infographic),
            rule!("people_also_ask", ["people also ask"] => Typology::Faqs),
            rule!("knowledge_panel", ["knowledge panel"] => Typology::BroadDefinitionBlogArticle),
            rule!("news", ["news", "top stories"] => Typology::IndustryNews),
        ],
    }
}

pub fn transactional_rules() -> RuleTable {
    RuleTable {
        intents: &["transactional", "transacional"],
        rules: vec![
            rule!(
                "ads",
                ["shopping ads", "ads top", "ads bottom", "ads middle"]
                    => Typology::ConversionOptimizedPage
            ),
            rule!(
                "vertical_pack",
                ["hotel pack", "flights", "recipes", "jobs"] => Typology::ProductServicePage
            ),
            rule!("buying_guide", ["buying guide"] => Typology::ProductServicePage),
            rule!(
                "product_listing",
                ["popular products", "related products", "organic carousel"]
                    => Typology::ProductServicePage
            ),
            rule!(
                "local",
                ["address pack", "twitter carousel"] => Typology::ProductServicePage
            ),
        ],
    }
}

pub fn commercial_rules() -> RuleTable {
    RuleTable {
        intents: &["commercial"],
        rules: vec![
            rule!("reviews", ["featured reviews", "video carousel"] => Typology::Comparison),
            rule!("buying_guide", ["buying guide"] => Typology::Comparison),
            rule!("forums", ["discussions and forums"] => Typology::Comparison),
            rule!(
                "exploration",
                ["brands", "explore", "related searches", "related products"]
                    => Typology::Comparison
            ),
            rule!("questions", ["questions and answers"] => Typology::Faqs),
        ],
    }
}

pub fn navigational_rules() -> RuleTable {
    RuleTable {
        intents: &["navegacional"],
        rules: vec![
            rule!("sitelinks", ["sitelinks"] => Typology::Documentation),
            rule!("knowledge_panel", ["knowledge panel"] => Typology::UpdateBlog),
            rule!("twitter", ["twitter", "twitter carousel"] => Typology::UpdateBlog),
            rule!(
                "support",
                ["find results on", "address pack"] => Typology::SupportPage
            ),
        ],
    }
}

pub fn default_rule_tables() -> Vec<RuleTable> {
    vec![
        informational_rules(),
        transactional_rules(),
        commercial_rules(),
        navigational_rules(),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
