//! Message and tip templates per mood.

use crate::lexicon;
use crate::models::MoodCategory;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodResponse {
    pub message: String,
    pub tips: Vec<String>,
    /// Sub-keyword variant that shaped the text, `None` for the generic one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<&'static str>,
}

struct Template {
    message: &'static str,
    tips: &'static [&'static str],
}

fn generic(category: MoodCategory) -> Template {
    match category {
        MoodCategory::Happy => Template {
            message: "You're radiating positive energy! Your happiness is contagious and brings light to those around you.",
            tips: &["Share your joy with others", "Practice gratitude", "Engage in activities you love"],
        },
        MoodCategory::Sad => Template {
            message: "It's okay to feel sad. Your emotions are valid, and this feeling will pass. You're stronger than you know.",
            tips: &["Reach out to a friend", "Practice self-care", "Consider talking to someone"],
        },
        MoodCategory::Angry => Template {
            message: "Your anger is telling you something important. Take time to understand what's triggering these feelings.",
            tips: &["Take deep breaths", "Step away from the situation", "Express yourself safely"],
        },
        MoodCategory::Excited => Template {
            message: "Your energy is amazing! Channel this excitement into something productive and meaningful.",
            tips: &["Set new goals", "Start a creative project", "Share your enthusiasm"],
        },
        MoodCategory::Calm => Template {
            message: "Your inner peace is beautiful. This calm state is perfect for reflection and mindful decisions.",
            tips: &["Practice meditation", "Enjoy quiet moments", "Help others find peace"],
        },
        MoodCategory::Anxious => Template {
            message: "Your mind is very active right now. Remember that anxiety often comes from caring deeply about things.",
            tips: &["Practice breathing exercises", "Break tasks into smaller steps", "Ground yourself in the present"],
        },
    }
}

// Keyed by the variant names declared in `lexicon`.
fn variant(category: MoodCategory, name: &str) -> Option<Template> {
    let template = match (category, name) {
        (MoodCategory::Happy, "gratitude") => Template {
            message: "Gratitude looks good on you. Noticing what's going right makes the good moments last longer.",
            tips: &["Write down three things you're thankful for", "Tell someone you appreciate them", "Savor this moment before moving on"],
        },
        (MoodCategory::Happy, "connection") => Template {
            message: "Time with the people who matter is one of the best sources of happiness. It's wonderful that you have that.",
            tips: &["Let them know how much they mean to you", "Plan your next get-together", "Capture a photo or note of today"],
        },
        (MoodCategory::Happy, "achievement") => Template {
            message: "You worked for this and it paid off. Take a moment to be proud of yourself.",
            tips: &["Celebrate the win, however small", "Note what helped you succeed", "Share the news with someone who cheered you on"],
        },
        (MoodCategory::Sad, "tired") => Template {
            message: "It sounds like you're running low on energy. Feeling worn out makes everything heavier, and rest is not a luxury right now.",
            tips: &["Aim for an early night and a full night's sleep", "Take a short break away from screens", "Drink some water and eat something nourishing"],
        },
        (MoodCategory::Sad, "lonely") => Template {
            message: "Feeling lonely is painful, and it doesn't mean something is wrong with you. Connection is still within reach.",
            tips: &["Send a message to someone you trust", "Spend some time in a shared space like a cafe or park", "Look into a group or class around something you enjoy"],
        },
        (MoodCategory::Sad, "disappointed") => Template {
            message: "Disappointment means you hoped for something that mattered. That hope is still worth holding on to.",
            tips: &["Give yourself permission to feel let down", "Separate what you can control from what you can't", "Write down one small next step"],
        },
        (MoodCategory::Angry, "work") => Template {
            message: "Work frustrations can follow you home. Your reaction makes sense, and it's worth finding a calm way to address it.",
            tips: &["Take a walk before responding to anyone", "Write down what exactly set you off", "Raise the issue when you feel steadier"],
        },
        (MoodCategory::Angry, "relationship") => Template {
            message: "Conflict with someone close hurts in a particular way. Your feelings are valid, and so is taking space before talking.",
            tips: &["Take some space before the conversation", "Use 'I feel' statements when you talk", "Listen for what they need too"],
        },
        (MoodCategory::Angry, "unfair") => Template {
            message: "Being treated unfairly is a real reason to be angry. That energy can become a clear, firm response.",
            tips: &["Name exactly what felt unfair", "Decide what outcome you actually want", "Talk it through with someone you trust"],
        },
        (MoodCategory::Excited, "project") => Template {
            message: "A new project is a great outlet for this energy! Channel that momentum into the first concrete steps.",
            tips: &["Channel your energy into a first small milestone", "Sketch out a simple plan", "Tell someone about it to stay accountable"],
        },
        (MoodCategory::Excited, "travel") => Template {
            message: "Adventure ahead! Anticipation is part of the fun, so enjoy every bit of it.",
            tips: &["Make a list of things you want to experience", "Get the practical prep out of the way early", "Leave room for spontaneity"],
        },
        (MoodCategory::Excited, "event") => Template {
            message: "Something special is coming up and your excitement shows. Let yourself look forward to it fully.",
            tips: &["Prepare anything you need ahead of time", "Share the anticipation with others who are going", "Get good rest the night before"],
        },
        (MoodCategory::Calm, "mindful") => Template {
            message: "Your practice is paying off. This stillness is something you've cultivated, and you can return to it anytime.",
            tips: &["Keep your practice going tomorrow", "Notice how your body feels right now", "Carry one slow breath into your next task"],
        },
        (MoodCategory::Calm, "nature") => Template {
            message: "Time outdoors has a way of quieting the mind. It's lovely that you made space for it.",
            tips: &["Plan another outing this week", "Leave your phone in your pocket for a while", "Notice the small details around you"],
        },
        (MoodCategory::Calm, "rest") => Template {
            message: "Being well rested shows. This is a good moment to think clearly and make thoughtful choices.",
            tips: &["Protect the routine that got you here", "Use this clarity for a decision you've been putting off", "Enjoy the slower pace"],
        },
        (MoodCategory::Anxious, "deadline") => Template {
            message: "Pressure from a deadline or evaluation can make everything feel urgent. You can handle this one step at a time.",
            tips: &["Break the task into smaller steps", "Focus on the next thirty minutes only", "Schedule short breaks to reset"],
        },
        (MoodCategory::Anxious, "future") => Template {
            message: "Uncertainty about what's ahead is hard to sit with. Bring your attention back to what you can shape today.",
            tips: &["Ground yourself in the present with your senses", "List what is within your control", "Limit time spent on worst-case thinking"],
        },
        (MoodCategory::Anxious, "sleepless") => Template {
            message: "An anxious mind and restless nights feed each other. Being gentle with your evenings can help break the cycle.",
            tips: &["Try slow breathing exercises before bed", "Write your worries down to get them out of your head", "Keep screens out of bed"],
        },
        _ => return None,
    };
    Some(template)
}

/// Picks the message and tips for a mood. With text, the first matching
/// sub-keyword variant of that mood wins; otherwise the generic one is used.
pub fn generate_response(category: MoodCategory, original_text: Option<&str>) -> MoodResponse {
    let refined = original_text
        .and_then(|text| lexicon::refine(category, text))
        .and_then(|group| variant(category, group.name).map(|template| (group.name, template)));

    let (name, template) = match refined {
        Some((name, template)) => (Some(name), template),
        None => (None, generic(category)),
    };

    MoodResponse {
        message: template.message.to_string(),
        tips: template.tips.iter().map(|tip| tip.to_string()).collect(),
        variant: name,
    }
}
