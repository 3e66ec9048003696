//! crates/krushi_core/src/prompts.rs
//!
//! Prompt templates sent to the generative model. Templates use `{name}`
//! placeholders that are filled with `str::replace`.

use crate::domain::{CropQuery, Preference, TreatmentQuery};
use crate::language::{normalize_code, PromptLanguage};

//=========================================================================================
// Treatment Advice
//=========================================================================================

const TREATMENT_EN: &str = r#"You are a crop disease expert. The crop is affected by: {disease}

- Mention the disease type (e.g., fungal, bacterial, viral)
{treatment}
- For each pesticide, provide:
  - Name
  - Type (Organic/Inorganic)
  - Dosage (ml or g per liter)
  - Frequency (e.g., every 7 days)
  - Safety Tip (1 line)

Finally, recommend ONE best pesticide and explain why.

Format:
Disease: ...
Type: ...
Pesticides:
1. ...
2. ...
3. ...
Recommended: ...
"#;

const TREATMENT_HI: &str = r#"आप एक कृषि रोग विशेषज्ञ हैं। फसल पर {disease} रोग है।

- रोग का प्रकार बताएं (फफूंद, जीवाणु, विषाणु)
{treatment}
- प्रत्येक के लिए:
  - नाम
  - प्रकार (जैविक/अजैविक)
  - मात्रा (ml/g प्रति लीटर)
  - छिड़काव की आवृत्ति (जैसे हर 7 दिन)
  - सुरक्षा सुझाव (1 पंक्ति)

अंत में, सबसे उपयुक्त एक कीटनाशक सुझाएं और कारण बताएं।

Format:
Disease: ...
Type: ...
Pesticides:
1. ...
2. ...
3. ...
Recommended: ...
"#;

const TREATMENT_MR: &str = r#"तुम्ही एक पिक रोगतज्ज्ञ आहात. पिकावर {disease} रोग आहे.

- रोगाचा प्रकार सांगा (बुरशीजन्य, जिवाणूजन्य, विषाणूजन्य)
{treatment}
- प्रत्येकसाठी:
  - नाव
  - प्रकार (सेंद्रिय/अजैविक)
  - मात्रा (ml/g प्रति लिटर)
  - फवारणी वारंवारता
  - सुरक्षा सूचना

शेवटी, सर्वोत्कृष्ट कीटकनाशक निवडा आणि कारण सांगा.

रूपरेषा:
Disease: ...
Type: ...
Pesticides:
1. ...
2. ...
3. ...
Recommended: ...
"#;

/// Builds the treatment prompt in the requested language. Languages other
/// than Hindi and Marathi get the English template.
pub fn treatment_prompt(query: &TreatmentQuery) -> String {
    let (template, treatment) = match normalize_code(&query.language).as_str() {
        "hi" => (
            TREATMENT_HI,
            match query.preference {
                Preference::Organic => {
                    "- सुझाव दें: 2–3 सर्वोत्तम जैविक कीटनाशक, मात्रा और छिड़काव के साथ।"
                }
                Preference::Inorganic => {
                    "- सुझाव दें: 2–3 सर्वोत्तम अजैविक कीटनाशक, मात्रा और छिड़काव के साथ।"
                }
                Preference::Best => {
                    "- सुझाव दें: 2–3 सर्वोत्तम कीटनाशक (जैविक/अजैविक), नाम, मात्रा और उपयोग शामिल करें।"
                }
            },
        ),
        "mr" => (
            TREATMENT_MR,
            match query.preference {
                Preference::Organic => {
                    "- 2–3 सर्वोत्तम सेंद्रिय कीटकनाशक सुचवा, डोस आणि फवारणी कालावधीसह."
                }
                Preference::Inorganic => {
                    "- 2–3 सर्वोत्तम अजैविक कीटकनाशक सुचवा, डोस आणि फवारणी कालावधीसह."
                }
                Preference::Best => {
                    "- 2–3 सर्वोत्तम कीटकनाशक (सेंद्रिय/अजैविक) सुचवा, नाव, डोस, फवारणी."
                }
            },
        ),
        _ => (
            TREATMENT_EN,
            match query.preference {
                Preference::Organic => {
                    "- Suggest 2–3 best organic pesticides with dosage and frequency."
                }
                Preference::Inorganic => {
                    "- Suggest 2–3 best inorganic pesticides with dosage and frequency."
                }
                Preference::Best => {
                    "- Suggest 2–3 best pesticides (organic/inorganic), include name, dosage, frequency."
                }
            },
        ),
    };

    // `{treatment}` first so a disease name containing braces is left alone.
    template
        .replace("{treatment}", treatment)
        .replace("{disease}", query.disease.trim())
}

//=========================================================================================
// Farming Chat
//=========================================================================================

const FARMING_CONTEXT: &str = r#"You are an expert in agriculture and farming. Focus on:
1. Crop diseases and treatments
2. Best farming practices
3. Seasonal crop recommendations
4. Pest control methods
5. Soil health management
6. Water management
7. Organic farming techniques
8. Modern farming technologies
Provide practical, actionable advice that farmers can implement."#;

const CHAT_CLOSING: &str = r#"Provide a clear, concise response that a farmer can easily understand and implement.
Focus on practical solutions and local farming context.
Answer in the requested language."#;

const VOICE_CHAT_CLOSING: &str = r#"Provide a detailed yet clear response that:
1. Is easy to understand when spoken
2. Uses simple language and short sentences
3. Includes step-by-step instructions if applicable
4. Avoids technical jargon unless necessary
5. Summarizes key points at the end

Format the response in a conversational style suitable for text-to-speech."#;

/// Which flavour of chat answer to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStyle {
    Concise,
    Spoken,
}

pub fn chat_prompt(message: &str, language: &str, style: ChatStyle) -> String {
    let closing = match style {
        ChatStyle::Concise => CHAT_CLOSING,
        ChatStyle::Spoken => VOICE_CHAT_CLOSING,
    };
    format!(
        "{}\n{}\n\nQuestion: {}\n\n{}",
        FARMING_CONTEXT,
        PromptLanguage::instruction_for(language),
        message.trim(),
        closing
    )
}

//=========================================================================================
// Crop Recommendation
//=========================================================================================

fn describe_conditions(query: &CropQuery) -> String {
    format!(
        "Nitrogen (N): {}\nPhosphorus (P): {}\nPotassium (K): {}\nTemperature: {} °C\nHumidity: {} %\nSoil pH: {}\nRainfall: {} mm",
        query.n, query.p, query.k, query.temperature, query.humidity, query.ph, query.rainfall
    )
}

/// Asks the model to pick the crop itself; used when the local model is unavailable.
pub fn crop_prediction_prompt(query: &CropQuery) -> String {
    format!(
        "You are an agronomist. Based on the following soil and climate conditions, \
         name the single most suitable crop to grow.\n\n{}\n\n\
         Reply with only the crop name on the first line. \
         On the following lines, explain in 2-3 short sentences why it suits these conditions.",
        describe_conditions(query)
    )
}

/// Asks the model to justify a crop the local model already chose.
pub fn crop_rationale_prompt(query: &CropQuery, crop: &str) -> String {
    format!(
        "You are an agronomist. A crop recommendation model suggested {crop} for a field \
         with the following soil and climate conditions.\n\n{}\n\n\
         Explain in 2-3 short sentences, in simple language for a farmer, why {crop} suits these conditions.",
        describe_conditions(query)
    )
}

//=========================================================================================
// Voice Questions and Frame Inspection
//=========================================================================================

pub fn voice_question_prompt(query: &str) -> String {
    format!(
        "Answer this crop-related question simply and briefly for farmers: {}",
        query.trim()
    )
}

pub const ANIMAL_CHECK_INSTRUCTION: &str = "Does this image contain an animal? If yes, tell me which animal it is. Respond only with the animal name.";
