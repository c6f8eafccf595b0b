//! Canned assistant answers for the Q&A board.
//!
//! There is no model behind this: each category maps to one fixed answer.

pub const DESIGN_ANSWER: &str = "For room design, start by defining the room's primary function, \
then arrange the largest furniture pieces first and leave at least 90 cm of walkway around them. \
Keep a consistent style and a limited color palette to make the space feel cohesive.";

pub const FURNITURE_ANSWER: &str = "When choosing furniture, measure the room and doorways first, \
then pick pieces that fit the scale of the space. Prioritize comfort and durable materials for \
items you use every day, such as sofas and office chairs.";

pub const BUSINESS_ANSWER: &str = "For business spaces, plan the layout around how people move \
through it: keep reception and waiting areas near the entrance, give staff clear work zones, \
and make sure the furniture meets accessibility requirements.";

pub const LIGHTING_ANSWER: &str = "Layer your lighting: combine ambient ceiling light, task \
lighting where you read or work, and accent lighting to highlight features. Warm white bulbs \
(2700K-3000K) suit living areas; cooler light works better in offices.";

pub const COLOR_ANSWER: &str = "Use the 60-30-10 rule: 60% dominant color for walls and large \
surfaces, 30% secondary color for furniture, and 10% accent color for accessories. Test paint \
samples under the room's real lighting before committing.";

pub const DEFAULT_ANSWER: &str = "Thanks for your question! Our design assistant suggests \
starting with the room's purpose and measurements, then choosing furniture and colors that \
support how you want to use the space.";

/// The answer for `category`. Unknown, blank or absent categories get
/// [`DEFAULT_ANSWER`].
pub fn canned_answer(category: Option<&str>) -> &'static str {
    let Some(category) = category else {
        return DEFAULT_ANSWER;
    };

    match category.trim().to_ascii_lowercase().as_str() {
        "design" => DESIGN_ANSWER,
        "furniture" => FURNITURE_ANSWER,
        "business" => BUSINESS_ANSWER,
        "lighting" => LIGHTING_ANSWER,
        "color" => COLOR_ANSWER,
        _ => DEFAULT_ANSWER,
    }
}
