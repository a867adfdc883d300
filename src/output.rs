//! Turning output word ids back into text.

use crate::manifest::PostProcess;
use crate::vocab::{Vocab, WordId, ES, SS};

/// Words for `ids`, dropping `<s>` and `</s>`.
pub fn words<'v>(vocab: &'v Vocab, ids: &[WordId]) -> Vec<&'v str> {
    ids.iter()
        .filter(|&&id| id != SS && id != ES)
        .filter_map(|&id| vocab.word(id))
        .collect()
}

/// Join words according to `post_process`.
pub fn post_process(words: &[&str], post_process: PostProcess) -> String {
    match post_process {
        PostProcess::Plain => words.join(" "),
        PostProcess::JoinChar => words
            .iter()
            .map(|w| if *w == "__" { " " } else { *w })
            .collect(),
        PostProcess::JoinBpe => words.join(" ").replace("@@ ", ""),
        PostProcess::JoinPiece => words.concat().replace('\u{2581}', " ").trim().to_string(),
    }
}

/// Render an output sentence.
pub fn render(vocab: &Vocab, ids: &[WordId], mode: PostProcess) -> String {
    post_process(&words(vocab, ids), mode)
}
