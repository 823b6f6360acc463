//! Fixtures shared by the unit tests

use crate::augmented::AugTree;
use crate::rb::{Color, ColorAccess};
use crate::synth::{Property, PropertySynthesizer};

/// A run of `len` copies of `ch` spanning `lines` line breaks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub ch: char,
    pub len: usize,
    pub lines: usize,
    color: Color,
}

impl Span {
    pub fn new(ch: char, len: usize, lines: usize) -> Self {
        Self {
            ch,
            len,
            lines,
            color: Color::Red,
        }
    }

    pub fn text(&self) -> String {
        std::iter::repeat_n(self.ch, self.len).collect()
    }
}

pub struct SpanColor;

impl ColorAccess<Span> for SpanColor {
    fn color(value: &Span) -> Color {
        value.color
    }
    fn set_color(value: &mut Span, color: Color) {
        value.color = color;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Stats {
    pub chars: usize,
    pub own_chars: usize,
    pub lines: usize,
    pub own_lines: usize,
    pub count: usize,
}

pub struct Chars;

impl Property<Span, Stats> for Chars {
    type Value = usize;
    fn of_value(value: &Span) -> usize {
        value.len
    }
    fn own(synth: &Stats) -> usize {
        synth.own_chars
    }
    fn set_own(synth: &mut Stats, value: usize) {
        synth.own_chars = value;
    }
    fn aggregate(synth: &Stats) -> usize {
        synth.chars
    }
    fn set_aggregate(synth: &mut Stats, value: usize) {
        synth.chars = value;
    }
}

pub struct Lines;

impl Property<Span, Stats> for Lines {
    type Value = usize;
    fn of_value(value: &Span) -> usize {
        value.lines
    }
    fn own(synth: &Stats) -> usize {
        synth.own_lines
    }
    fn set_own(synth: &mut Stats, value: usize) {
        synth.own_lines = value;
    }
    fn aggregate(synth: &Stats) -> usize {
        synth.lines
    }
    fn set_aggregate(synth: &mut Stats, value: usize) {
        synth.lines = value;
    }
}

pub struct Count;

impl Property<Span, Stats> for Count {
    type Value = usize;
    fn of_value(_: &Span) -> usize {
        1
    }
    fn own(_: &Stats) -> usize {
        1
    }
    fn set_own(_: &mut Stats, _: usize) {}
    fn aggregate(synth: &Stats) -> usize {
        synth.count
    }
    fn set_aggregate(synth: &mut Stats, value: usize) {
        synth.count = value;
    }
}

pub type SpanSynth = PropertySynthesizer<(Chars, Lines, Count)>;
pub type SpanTree = AugTree<Span, Stats, SpanSynth, SpanColor>;

/// Concatenates the text of all spans in order
pub fn text_of<'a>(spans: impl Iterator<Item = &'a Span>) -> String {
    spans.map(Span::text).collect()
}
