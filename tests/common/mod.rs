pub mod mock_audio;
pub mod mock_dictation;
pub mod mock_server;

use lexitalk::session::Question;

pub fn phonological_question() -> Question {
    Question::Phonological {
        question: "Which spelling matches 'ship'?".to_string(),
        choices: vec!["sip".to_string(), "ship".to_string(), "chip".to_string()],
        answer: None,
    }
}

pub fn surface_question(word: &str) -> Question {
    Question::Surface {
        word: word.to_string(),
        difficulty: None,
    }
}

pub fn naming_question(category: &str, difficulty: &str) -> Question {
    Question::RapidNaming {
        image: format!("static/images/{}.png", category),
        category: category.to_string(),
        difficulty: difficulty.to_string(),
        answer: None,
    }
}
