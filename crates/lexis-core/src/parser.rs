//! Extraction of dictionary entries from a fetched dictionary page.
//!
//! The page is a loosely structured HTML document. Within each main content
//! region it holds one or more dictionary-source blocks; each block carries a
//! shared head (part of speech, pronunciation, audio) and a list of senses,
//! and each sense carries its definition and example sentences:
//!
//! ```text
//! div.content
//! ├── h1.pagetitle                    title word
//! └── span.dictentry                  dictionary-source block
//!     └── span.dictlink
//!         ├── span.Head               POS, GRAM, PronCodes, speaker audio
//!         └── span.Sense              one entry per sense with a DEF
//!             ├── span.GRAM / span.DEF
//!             ├── span.GramExa        pattern + several EXAMPLEs
//!             └── span.EXAMPLE        bare sentence
//! ```
//!
//! Extraction is a fold over the immutable parsed tree carrying an
//! [`Extraction`] accumulator. Missing markup never fails the parse: blocks
//! without senses or without both audio recordings are skipped, and a block
//! from a different dictionary ends the region.

use std::ops::ControlFlow;

use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::{Entry, Error, Example, Pronunciation, Result, Sentence};

const AUDIO_ATTR: &str = "data-src-mp3";

/// Running state of one parse: the next rank to hand out and the entries so far.
#[derive(Debug, Default)]
struct Extraction {
    rank: u32,
    entries: Vec<Entry>,
}

impl Extraction {
    const fn next_rank(&mut self) -> u32 {
        self.rank += 1;
        self.rank
    }
}

/// Fields read once per block and shared by all of its senses.
struct BlockHead {
    part_of_speech: String,
    grammar_note: String,
    pronunciation: Pronunciation,
}

/// Parser for dictionary pages.
///
/// Selectors are compiled once; a single parser can be shared across lookups.
pub struct DictionaryParser {
    content: Selector,
    page_title: Selector,
    dict_entry: Selector,
    dictionary_intro: Selector,
    dict_link: Selector,
    sense: Selector,
    definition: Selector,
    homonym_number: Selector,
    grammar: Selector,
    part_of_speech: Selector,
    head_grammar: Selector,
    pron_codes: Selector,
    uk_speaker: Selector,
    us_speaker: Selector,
    example_child: Selector,
    gram_exa: Selector,
    example: Selector,
    pattern: Selector,
    audio: Selector,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Parse(format!("invalid selector '{css}': {e}")))
}

impl DictionaryParser {
    /// Compile the extraction selectors.
    pub fn new() -> Result<Self> {
        Ok(Self {
            content: selector("div.content")?,
            page_title: selector("h1.pagetitle")?,
            dict_entry: selector("span.dictentry")?,
            dictionary_intro: selector(".dictionary_intro")?,
            dict_link: selector("span.dictlink")?,
            sense: selector("span.Sense")?,
            definition: selector("span.DEF")?,
            homonym_number: selector("span.REFHOMNUM")?,
            grammar: selector("span.GRAM")?,
            part_of_speech: selector("span.Head span.POS")?,
            head_grammar: selector("span.Head span.GRAM")?,
            pron_codes: selector("span.Head span.PronCodes")?,
            uk_speaker: selector("span.speaker.brefile")?,
            us_speaker: selector("span.speaker.amefile")?,
            example_child: selector("span.GramExa, span.EXAMPLE")?,
            gram_exa: selector(".GramExa")?,
            example: selector("span.EXAMPLE")?,
            pattern: selector("span.PROPFORMPREP, span.PROPFORM")?,
            audio: selector("span[data-src-mp3]")?,
        })
    }

    /// Parse `html`, the page fetched for `queried_word`, into entries in page order.
    ///
    /// `queried_word` is expected to be lower-cased already; it becomes a
    /// query key of every entry whose title word differs from it.
    pub fn parse(&self, html: &str, queried_word: &str) -> Vec<Entry> {
        let document = Html::parse_document(html);

        let extraction = document
            .select(&self.content)
            .fold(Extraction::default(), |acc, region| {
                self.extract_region(acc, region, queried_word)
            });

        debug!(
            "Extracted {} entries for '{}'",
            extraction.entries.len(),
            queried_word
        );
        extraction.entries
    }

    fn extract_region(&self, acc: Extraction, region: ElementRef<'_>, queried_word: &str) -> Extraction {
        let title_word = text_of(region.select(&self.page_title));
        let keys = query_keys(&title_word, queried_word);

        let folded = region
            .select(&self.dict_entry)
            .enumerate()
            .try_fold(acc, |acc, (index, block)| {
                self.extract_block(acc, index, block, &title_word, &keys)
            });

        match folded {
            ControlFlow::Continue(acc) | ControlFlow::Break(acc) => acc,
        }
    }

    fn extract_block(
        &self,
        mut acc: Extraction,
        index: usize,
        block: ElementRef<'_>,
        title_word: &str,
        query_keys: &[String],
    ) -> ControlFlow<Extraction, Extraction> {
        // Only the leading dictionary is used; later blocks introducing
        // another dictionary end the region.
        if index > 0 && block.select(&self.dictionary_intro).next().is_some() {
            debug!("Block {} is from another dictionary, stopping", index);
            return ControlFlow::Break(acc);
        }

        let links: Vec<ElementRef<'_>> = block.select(&self.dict_link).collect();
        let senses = self.senses(&links);
        if senses.is_empty() {
            debug!("Block {} has no senses, skipping", index);
            return ControlFlow::Continue(acc);
        }

        let Some(head) = self.block_head(&links) else {
            debug!("Block {} lacks UK or US audio, skipping {} senses", index, senses.len());
            return ControlFlow::Continue(acc);
        };

        debug!(
            "Block {}: partOfSpeech={:?} grammarNote={:?} pronunciation={:?}",
            index, head.part_of_speech, head.grammar_note, head.pronunciation.text
        );

        for sense in senses {
            let entry = Entry {
                word: title_word.to_string(),
                part_of_speech: head.part_of_speech.clone(),
                grammar_note: head.grammar_note.clone(),
                pronunciation: head.pronunciation.clone(),
                definition_grammar_note: text_of(sense.select(&self.grammar)),
                definition: self.definition(sense),
                examples: self.examples(sense),
                order_rank: acc.next_rank(),
                query_keys: query_keys.to_vec(),
                ..Entry::default()
            };
            acc.entries.push(entry);
        }

        ControlFlow::Continue(acc)
    }

    /// Sense markers carrying a definition, in document order and without duplicates.
    fn senses<'a>(&self, links: &[ElementRef<'a>]) -> Vec<ElementRef<'a>> {
        let mut senses: Vec<ElementRef<'a>> = Vec::new();
        for sense in links.iter().flat_map(|link| link.select(&self.sense)) {
            if sense.select(&self.definition).next().is_none() {
                continue;
            }
            if senses.iter().any(|seen| seen.id() == sense.id()) {
                continue;
            }
            senses.push(sense);
        }
        senses
    }

    /// Read the shared head of a block; `None` when either recording is missing.
    fn block_head(&self, links: &[ElementRef<'_>]) -> Option<BlockHead> {
        let uk_audio_url = first_attr(links, &self.uk_speaker, AUDIO_ATTR)?;
        let us_audio_url = first_attr(links, &self.us_speaker, AUDIO_ATTR)?;

        Some(BlockHead {
            part_of_speech: text_of(links.iter().flat_map(|l| l.select(&self.part_of_speech))),
            grammar_note: text_of(links.iter().flat_map(|l| l.select(&self.head_grammar))),
            pronunciation: Pronunciation {
                text: text_of(links.iter().flat_map(|l| l.select(&self.pron_codes))),
                uk_audio_url,
                us_audio_url,
            },
        })
    }

    /// Definition text with homonym reference numbers removed.
    fn definition(&self, sense: ElementRef<'_>) -> String {
        let mut text = String::new();
        for def in sense.select(&self.definition) {
            push_text_excluding(def, &self.homonym_number, &mut text);
        }
        text.trim().to_string()
    }

    fn examples(&self, sense: ElementRef<'_>) -> Vec<Example> {
        sense
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| self.example_child.matches(child))
            .map(|child| {
                if self.gram_exa.matches(&child) {
                    Example {
                        pattern: text_of(child.select(&self.pattern)),
                        sentences: child.select(&self.example).map(|s| self.sentence(s)).collect(),
                    }
                } else {
                    Example {
                        pattern: String::new(),
                        sentences: vec![self.sentence(child)],
                    }
                }
            })
            .collect()
    }

    fn sentence(&self, element: ElementRef<'_>) -> Sentence {
        let audio_url = element
            .select(&self.audio)
            .next()
            .and_then(|audio| audio.value().attr(AUDIO_ATTR))
            .unwrap_or_default()
            .to_string();

        Sentence {
            audio_url,
            text: element.text().collect::<String>().trim().to_string(),
        }
    }
}

/// Keys an entry is retrievable under: the lower-cased title word, plus the
/// queried word when the two differ. Empty keys are dropped.
fn query_keys(title_word: &str, queried_word: &str) -> Vec<String> {
    let title_key = title_word.to_lowercase();
    let queried_key = queried_word.to_lowercase();

    let mut keys = Vec::with_capacity(2);
    if !title_key.is_empty() {
        keys.push(title_key);
    }
    if !queried_key.is_empty() && !keys.contains(&queried_key) {
        keys.push(queried_key);
    }
    keys
}

/// Concatenated, trimmed text of all `elements`.
fn text_of<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    let mut text = String::new();
    for element in elements {
        text.extend(element.text());
    }
    text.trim().to_string()
}

/// Attribute `name` of the first element matching `selector` under `scopes`.
///
/// Only the first match is consulted, as when reading a single speaker icon.
fn first_attr(scopes: &[ElementRef<'_>], selector: &Selector, name: &str) -> Option<String> {
    scopes
        .iter()
        .find_map(|scope| scope.select(selector).next())
        .and_then(|element| element.value().attr(name))
        .map(str::to_string)
}

/// Append the text of `element`, skipping subtrees that match `excluded`.
fn push_text_excluding(element: ElementRef<'_>, excluded: &Selector, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if !excluded.matches(&child) {
                        push_text_excluding(child, excluded, out);
                    }
                }
            },
            _ => {},
        }
    }
}
