//! The SENSEI user-profile schema.
//!
//! A profile describes a simulated user: which LLM drives it, who the user is
//! and what they want, how the chatbot under test behaves, and how the
//! conversations are sampled.

use crate::registry::RequiredFieldSpec;
use crate::types::SchemaEntry;

// ============================================================================
// Root
// ============================================================================

const ROOT: &[SchemaEntry] = &[
    SchemaEntry::text("test_name", "Unique name identifying this test profile"),
    SchemaEntry::block("llm", "Settings of the language model that plays the user"),
    SchemaEntry::block("user", "Who the simulated user is and what they want"),
    SchemaEntry::block("chatbot", "Expected behaviour of the chatbot under test"),
    SchemaEntry::block("conversation", "How conversations are generated and bounded"),
];

// ============================================================================
// llm
// ============================================================================

const LLM: &[SchemaEntry] = &[
    SchemaEntry::scalar("temperature", "Sampling temperature, between 0.0 and 1.0"),
    SchemaEntry::scalar("model", "Model identifier, e.g. gpt-4o-mini"),
    SchemaEntry::block("format", "Output modality of the simulated user"),
];

const LLM_FORMAT: &[SchemaEntry] = &[
    SchemaEntry::scalar("type", "Either text or speech"),
    SchemaEntry::text("config", "Path to the speech synthesis configuration"),
];

const LLM_FORMAT_TYPE: &[SchemaEntry] = &[
    SchemaEntry::value("text", "Plain text messages"),
    SchemaEntry::value("speech", "Synthesised voice messages"),
];

const LLM_MODEL: &[SchemaEntry] = &[
    SchemaEntry::value("gpt-4o", "OpenAI GPT-4o"),
    SchemaEntry::value("gpt-4o-mini", "OpenAI GPT-4o mini"),
    SchemaEntry::value("gpt-4.1", "OpenAI GPT-4.1"),
];

// ============================================================================
// user
// ============================================================================

const USER: &[SchemaEntry] = &[
    SchemaEntry::scalar("language", "Language the user writes in"),
    SchemaEntry::text("role", "Prompt describing the role the user plays"),
    SchemaEntry::list("context", "Extra prompt lines and personality presets"),
    SchemaEntry::list("goals", "Requests the user makes, with optional variables"),
];

const USER_LANGUAGE: &[SchemaEntry] = &[
    SchemaEntry::value("English", "English"),
    SchemaEntry::value("Spanish", "Spanish"),
    SchemaEntry::value("French", "French"),
    SchemaEntry::value("Italian", "Italian"),
    SchemaEntry::value("Portuguese", "Portuguese"),
];

const USER_CONTEXT: &[SchemaEntry] = &[SchemaEntry::scalar(
    "personality",
    "Path to a personality preset",
)];

const USER_CONTEXT_PERSONALITY: &[SchemaEntry] = &[
    SchemaEntry::variable(
        "personalities/conversational-user.yml",
        "Talkative user who chats around the goal",
    ),
    SchemaEntry::variable("personalities/formal-user.yml", "Polite, formal register"),
    SchemaEntry::variable("personalities/rude-user.yml", "Impatient and rude"),
    SchemaEntry::variable("personalities/sarcastic-user.yml", "Answers with sarcasm"),
];

const USER_GOALS: &[SchemaEntry] = &[
    SchemaEntry::scalar("function", "How values of this variable are picked"),
    SchemaEntry::scalar("type", "Data type of the variable"),
    SchemaEntry::list("data", "Values the variable can take"),
];

const USER_GOALS_FUNCTION: &[SchemaEntry] = &[
    SchemaEntry::function("default", "Use every value in order"),
    SchemaEntry::function("random", "Pick one value at random, or random(n) values"),
    SchemaEntry::function("another", "Pick a value not used before"),
    SchemaEntry::function("forward", "Iterate values, optionally nested with another variable"),
];

const USER_GOALS_TYPE: &[SchemaEntry] = &[
    SchemaEntry::value("string", "Free text"),
    SchemaEntry::value("int", "Integer numbers"),
    SchemaEntry::value("float", "Decimal numbers"),
];

const USER_GOALS_DATA: &[SchemaEntry] = &[
    SchemaEntry::scalar("min", "Lower bound of a numeric range"),
    SchemaEntry::scalar("max", "Upper bound of a numeric range"),
    SchemaEntry::scalar("step", "Increment of a numeric range"),
    SchemaEntry::text("any", "Let the LLM invent a value from this prompt"),
];

// ============================================================================
// chatbot
// ============================================================================

const CHATBOT: &[SchemaEntry] = &[
    SchemaEntry::scalar("is_starter", "Whether the chatbot opens the conversation"),
    SchemaEntry::text("fallback", "Message the chatbot sends when it does not understand"),
    SchemaEntry::list("output", "Data to extract from the chatbot answers"),
];

const CHATBOT_IS_STARTER: &[SchemaEntry] = &[
    SchemaEntry::value("True", "The chatbot speaks first"),
    SchemaEntry::value("False", "The user speaks first"),
];

const CHATBOT_OUTPUT: &[SchemaEntry] = &[
    SchemaEntry::scalar("type", "Data type of the extracted value"),
    SchemaEntry::text("description", "What the extracted value means"),
];

const CHATBOT_OUTPUT_TYPE: &[SchemaEntry] = &[
    SchemaEntry::value("int", "Integer number"),
    SchemaEntry::value("float", "Decimal number"),
    SchemaEntry::value("money", "Amount with currency"),
    SchemaEntry::value("str", "Short string"),
    SchemaEntry::value("string", "Free text"),
    SchemaEntry::value("time", "Time of day"),
    SchemaEntry::value("date", "Calendar date"),
];

// ============================================================================
// conversation
// ============================================================================

const CONVERSATION: &[SchemaEntry] = &[
    SchemaEntry::scalar("number", "How many conversations to run"),
    SchemaEntry::scalar("max_cost", "Budget cap for the whole run, in dollars"),
    SchemaEntry::block("goal_style", "When a conversation counts as finished"),
    SchemaEntry::list("interaction_style", "How the user phrases messages"),
];

const CONVERSATION_NUMBER: &[SchemaEntry] = &[
    SchemaEntry::variable("all_combinations", "One conversation per variable combination"),
    SchemaEntry::function("sample", "A fraction of all combinations, e.g. sample(0.2)"),
];

const CONVERSATION_GOAL_STYLE: &[SchemaEntry] = &[
    SchemaEntry::scalar("steps", "Stop after this many turns"),
    SchemaEntry::scalar("random_steps", "Stop after a random number of turns up to this bound"),
    SchemaEntry::block("all_answered", "Stop when every output has been extracted"),
    SchemaEntry::value("default", "Use the default stop condition"),
    SchemaEntry::scalar("max_cost", "Budget cap per conversation, in dollars"),
];

const CONVERSATION_GOAL_STYLE_ALL_ANSWERED: &[SchemaEntry] = &[
    SchemaEntry::scalar("export", "Whether to export extracted data"),
    SchemaEntry::scalar("limit", "Maximum number of turns"),
];

const CONVERSATION_INTERACTION_STYLE: &[SchemaEntry] = &[
    SchemaEntry::list("random", "Pick one of the listed styles per conversation"),
    SchemaEntry::value("long phrase", "Write long, wordy messages"),
    SchemaEntry::value("change your mind", "Change a previous request midway"),
    SchemaEntry::list("change language", "Switch to one of the listed languages"),
    SchemaEntry::value("make spelling mistakes", "Introduce typos in messages"),
    SchemaEntry::value("single question", "Ask one thing per message"),
    SchemaEntry::value("all questions", "Ask everything in the first message"),
    SchemaEntry::value("default", "Plain, direct messages"),
];

/// Every registered path with its candidates.
pub(crate) const PATHS: &[(&str, &[SchemaEntry])] = &[
    ("", ROOT),
    ("llm", LLM),
    ("llm.model", LLM_MODEL),
    ("llm.format", LLM_FORMAT),
    ("llm.format.type", LLM_FORMAT_TYPE),
    ("user", USER),
    ("user.language", USER_LANGUAGE),
    ("user.context", USER_CONTEXT),
    ("user.context.personality", USER_CONTEXT_PERSONALITY),
    ("user.goals", USER_GOALS),
    ("user.goals.function", USER_GOALS_FUNCTION),
    ("user.goals.type", USER_GOALS_TYPE),
    ("user.goals.data", USER_GOALS_DATA),
    ("chatbot", CHATBOT),
    ("chatbot.is_starter", CHATBOT_IS_STARTER),
    ("chatbot.output", CHATBOT_OUTPUT),
    ("chatbot.output.type", CHATBOT_OUTPUT_TYPE),
    ("conversation", CONVERSATION),
    ("conversation.number", CONVERSATION_NUMBER),
    ("conversation.goal_style", CONVERSATION_GOAL_STYLE),
    (
        "conversation.goal_style.all_answered",
        CONVERSATION_GOAL_STYLE_ALL_ANSWERED,
    ),
    ("conversation.interaction_style", CONVERSATION_INTERACTION_STYLE),
];

/// Keys a complete profile defines.
pub(crate) const REQUIRED: RequiredFieldSpec = RequiredFieldSpec {
    top_level: &["test_name", "llm", "user", "chatbot", "conversation"],
    nested: &[
        ("user", &["role", "goals"]),
        ("chatbot", &["is_starter", "fallback"]),
        ("conversation", &["number", "goal_style", "interaction_style"]),
        ("llm.format", &["type"]),
    ],
};
