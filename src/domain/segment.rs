// src/domain/segment.rs

/// Closed set of behavioral segments. `Other` is a defensive fallback for
/// (recency, frequency) pairs the rule table somehow misses, not a designed
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Champions,
    Loyal,
    PotentialLoyal,
    Recent,
    Promising,
    NeedsAttention,
    CantLoseThem,
    AtRisk,
    AboutToSleep,
    Hibernating,
    Lost,
    Other,
}

/// Classify a customer from recency (days since last order at the cutoff)
/// and frequency (order count at the cutoff).
///
/// The rules are evaluated top to bottom and the first match wins. Several
/// ranges share endpoints (e.g. recency 60 is reachable by both
/// PotentialLoyal and NeedsAttention), so the ordering below carries meaning
/// and must not be rearranged.
pub fn classify(recency: i64, frequency: i64) -> Segment {
    if recency <= 30 && frequency >= 10 {
        Segment::Champions
    } else if recency > 30 && recency <= 120 && frequency >= 10 {
        Segment::Loyal
    } else if recency <= 60 && (2..=9).contains(&frequency) {
        Segment::PotentialLoyal
    } else if recency <= 30 && frequency == 1 {
        Segment::Recent
    } else if recency > 30 && recency <= 60 && frequency == 1 {
        Segment::Promising
    } else if recency > 60 && recency <= 120 && (2..=9).contains(&frequency) {
        Segment::NeedsAttention
    } else if recency > 120 && recency <= 360 && frequency >= 10 {
        Segment::CantLoseThem
    } else if recency > 120 && recency <= 180 && (2..=9).contains(&frequency) {
        Segment::AtRisk
    } else if recency > 60 && recency <= 180 && frequency == 1 {
        Segment::AboutToSleep
    } else if recency > 180 && recency <= 360 && (1..=9).contains(&frequency) {
        Segment::Hibernating
    } else if recency > 360 {
        Segment::Lost
    } else {
        Segment::Other
    }
}

impl Segment {
    /// Display order used by the dashboard and charts.
    pub const DISPLAY_ORDER: [Segment; 11] = [
        Segment::Champions,
        Segment::Loyal,
        Segment::PotentialLoyal,
        Segment::Recent,
        Segment::Promising,
        Segment::NeedsAttention,
        Segment::CantLoseThem,
        Segment::AtRisk,
        Segment::AboutToSleep,
        Segment::Hibernating,
        Segment::Lost,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Segment::Champions => "Champions",
            Segment::Loyal => "Loyal",
            Segment::PotentialLoyal => "Potential Loyal",
            Segment::Recent => "Recent",
            Segment::Promising => "Promising",
            Segment::NeedsAttention => "Needs Attention",
            Segment::CantLoseThem => "Can't Lose Them",
            Segment::AtRisk => "At Risk",
            Segment::AboutToSleep => "About To Sleep",
            Segment::Hibernating => "Hibernating",
            Segment::Lost => "Lost",
            Segment::Other => "Other",
        }
    }

    /// Inverse of `label`. Unknown text maps to `Other` so that a snapshot
    /// written by a future version still loads.
    pub fn parse_label(s: &str) -> Segment {
        match s {
            "Champions" => Segment::Champions,
            "Loyal" => Segment::Loyal,
            "Potential Loyal" => Segment::PotentialLoyal,
            "Recent" => Segment::Recent,
            "Promising" => Segment::Promising,
            "Needs Attention" => Segment::NeedsAttention,
            "Can't Lose Them" => Segment::CantLoseThem,
            "At Risk" => Segment::AtRisk,
            "About To Sleep" => Segment::AboutToSleep,
            "Hibernating" => Segment::Hibernating,
            "Lost" => Segment::Lost,
            _ => Segment::Other,
        }
    }

    /// Fixed outreach suggestion per segment. Pure lookup; `Other` has no
    /// suggestion.
    pub fn suggested_message(&self) -> &'static str {
        match self {
            Segment::Champions => "Thank-you and VIP offer",
            Segment::Loyal => "Thank-you and a perk",
            Segment::PotentialLoyal => "Encourage a third purchase",
            Segment::Recent => "Thank and follow up",
            Segment::Promising => "Encourage a second purchase",
            Segment::NeedsAttention => "Reminder to come back",
            Segment::CantLoseThem => "Win the customer back",
            Segment::AtRisk => "Win the customer back",
            Segment::AboutToSleep => "Encourage a second purchase",
            Segment::Hibernating => "Win the customer back",
            Segment::Lost => "Special offer or reactivation",
            Segment::Other => "",
        }
    }
}
