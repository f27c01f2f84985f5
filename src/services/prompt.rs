//! Prompt builders for the generation calls. The suppression list keeps the
//! model from re-teaching words the user already collected.

pub fn text_prompt(text: &str, known_words: &[String]) -> String {
    let ignore_list = known_words.join(", ");

    format!(
        r#"O usuário quer aprender: "{text}"
TAREFA: Traduza para o português e sugira 2 sinônimos ou termos relacionados.
REGRAS: Ignore estas palavras: [{ignore_list}].
SAÍDA OBRIGATÓRIA (JSON puro, sem texto extra):
{{
    "primary": {{ "source_text": "{text}", "target_text": "tradução" }},
    "highlighted_words": [
        {{ "word": "...", "translation": "...", "context": "frase de exemplo" }}
    ]
}}"#
    )
}

pub fn image_prompt(known_words: &[String]) -> String {
    let ignore_list = known_words.join(", ");

    format!(
        r#"Analise a imagem.
TAREFA 1: Tradução completa do texto visível para o português.
TAREFA 2: Escolha 3 palavras interessantes.
REGRAS: Ignore estas palavras: [{ignore_list}].
SAÍDA OBRIGATÓRIA (JSON puro, sem texto extra):
{{
    "primary": {{ "source_text": "texto original", "target_text": "tradução" }},
    "highlighted_words": [
        {{ "word": "...", "translation": "...", "context": "frase de exemplo" }}
    ]
}}"#
    )
}
