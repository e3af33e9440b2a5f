//! Recursive-descent parser over decoded characters

use crate::chars::{DecodedChar, decode};
use crate::error::ParseError;
use crate::{ParseOptions, ParseOutput};
use cref_span::Span;
use cref_syntax::keywords;
use cref_syntax::{
    ConversionKind, Ident, MemberName, MemberReference, OverloadableOperator, Parameter,
    ParameterList, PredefinedType, RefKind, ReferenceTree, Segment, SegmentName, TypeArgument,
    TypeArgumentList, TypePath, TypeRef,
};

/// Characters that can make up an operator token; `{` and `}` are read as `<` and `>`
const OPERATOR_CHARS: &str = "+-!~*/%&|^<>=";

/// Marker for an error that stops the parse; the error itself is already recorded
struct Fatal;

type PResult<T> = Result<T, Fatal>;

/// A name as scanned, before keyword classification
struct Word {
    text: String,
    span: Span,
    verbatim: bool,
}

impl Word {
    fn into_ident(self) -> Ident {
        Ident {
            text: self.text,
            span: self.span,
            verbatim: self.verbatim,
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        !self.verbatim && self.text == keyword
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub(crate) struct Parser<'text> {
    text: &'text str,
    chars: Vec<DecodedChar>,
    pos: usize,
    last_end: u32,
    options: ParseOptions,
    errors: Vec<ParseError>,
    drop_parameters: bool,
}

impl<'text> Parser<'text> {
    pub(crate) fn new(text: &'text str, options: ParseOptions) -> Self {
        Self {
            text,
            chars: decode(text),
            pos: 0,
            last_end: 0,
            options,
            errors: Vec::new(),
            drop_parameters: false,
        }
    }

    pub(crate) fn parse(mut self) -> ParseOutput {
        let tree = self.parse_reference().ok();
        ParseOutput {
            tree,
            errors: self.errors,
        }
    }

    // Cursor

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|decoded| decoded.ch)
    }

    fn offset(&self) -> u32 {
        self.chars
            .get(self.pos)
            .map_or(self.text.len() as u32, |decoded| decoded.span.start)
    }

    fn current_span(&self) -> Span {
        self.chars
            .get(self.pos)
            .map_or_else(|| Span::empty(self.text.len() as u32), |decoded| decoded.span)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn bump(&mut self) {
        if let Some(decoded) = self.chars.get(self.pos) {
            if !decoded.ch.is_whitespace() {
                self.last_end = decoded.span.end;
            }
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn skip_whitespace_from(&self, mut pos: usize) -> usize {
        while self
            .chars
            .get(pos)
            .is_some_and(|decoded| decoded.ch.is_whitespace())
        {
            pos += 1;
        }
        pos
    }

    fn at_char(&mut self, ch: char) -> bool {
        self.skip_whitespace();
        self.peek() == Some(ch)
    }

    fn error(&mut self, err: ParseError) -> Fatal {
        self.errors.push(err);
        Fatal
    }

    fn recoverable(&mut self, err: ParseError) {
        self.errors.push(err);
    }

    // Words

    /// Scan a name starting at `pos` without consuming anything, returning it and the
    /// position just past it
    fn word_at(&self, pos: usize) -> Option<(Word, usize)> {
        let start_pos = self.skip_whitespace_from(pos);
        let first = self.chars.get(start_pos)?;
        let verbatim = first.ch == '@';
        let mut end_pos = if verbatim { start_pos + 1 } else { start_pos };

        if !self
            .chars
            .get(end_pos)
            .is_some_and(|decoded| is_ident_start(decoded.ch))
        {
            return None;
        }

        let mut text = String::new();
        while let Some(decoded) = self.chars.get(end_pos) {
            if !is_ident_continue(decoded.ch) {
                break;
            }
            text.push(decoded.ch);
            end_pos += 1;
        }

        let span = first.span.to(self.chars[end_pos - 1].span);
        Some((
            Word {
                text,
                span,
                verbatim,
            },
            end_pos,
        ))
    }

    fn lookahead_word(&self) -> Option<(Word, usize)> {
        self.word_at(self.pos)
    }

    fn advance_to(&mut self, pos: usize) {
        while self.pos < pos {
            self.bump();
        }
    }

    /// Consume a name, reporting a verbatim marker that is not followed by one
    fn scan_word(&mut self) -> PResult<Option<Word>> {
        self.skip_whitespace();
        if let Some((word, next)) = self.lookahead_word() {
            self.advance_to(next);
            return Ok(Some(word));
        }
        if self.peek() == Some('@') {
            let span = self.current_span();
            return Err(self.error(ParseError::VerbatimSpecifier { span: span.into() }));
        }
        Ok(None)
    }

    fn eat_keyword(&mut self, keyword: &str) -> Option<Span> {
        let (word, next) = self.lookahead_word()?;
        if !word.is_keyword(keyword) {
            return None;
        }
        self.advance_to(next);
        Some(word.span)
    }

    fn double_colon_at(&self, pos: usize) -> bool {
        let pos = self.skip_whitespace_from(pos);
        let colon = |offset: usize| {
            self.chars
                .get(pos + offset)
                .is_some_and(|decoded| decoded.ch == ':')
        };
        colon(0) && colon(1)
    }

    // Reference structure

    fn parse_reference(&mut self) -> PResult<ReferenceTree> {
        self.skip_whitespace();
        if self.at_end() {
            let span = Span::new(0, self.text.len() as u32);
            return Err(self.error(ParseError::IdentifierExpected { span: span.into() }));
        }

        let start = self.offset();
        let (qualifier, member) = self.parse_member_path()?;
        let parameters = self.parse_parameters_for(&member)?;
        let end = self.last_end;

        self.skip_whitespace();
        if !self.at_end() {
            let span = Span::new(self.offset(), self.text.len() as u32);
            self.recoverable(ParseError::TrailingText {
                text: span.slice(self.text).to_string(),
                span: span.into(),
            });
        }

        let parameters = if self.drop_parameters {
            None
        } else {
            parameters
        };
        Ok(build_tree(qualifier, member, parameters, Span::new(start, end)))
    }

    fn parse_member_path(&mut self) -> PResult<(Option<TypePath>, MemberName)> {
        if let Some(member) = self.parse_special_member()? {
            return Ok((None, member));
        }

        self.skip_whitespace();
        let start = self.offset();
        let alias = self.parse_alias()?;
        let mut segments = Vec::new();

        loop {
            let allow_predefined = segments.is_empty() && alias.is_none();
            segments.push(self.parse_segment(allow_predefined, true)?);
            if !self.at_char('.') {
                break;
            }
            self.bump();

            if let Some(member) = self.parse_special_member()? {
                let end = segments.last().map_or(start, |segment| segment.span.end);
                let qualifier = TypePath {
                    alias,
                    segments,
                    span: Span::new(start, end),
                };
                return Ok((Some(qualifier), member));
            }
        }

        let Some(last) = segments.pop() else {
            let span = self.current_span();
            return Err(self.error(ParseError::IdentifierExpected { span: span.into() }));
        };
        let qualifier = if segments.is_empty() && alias.is_none() {
            None
        } else {
            let end = segments.last().map_or_else(
                || alias.as_ref().map_or(start, |alias| alias.span.end),
                |segment| segment.span.end,
            );
            Some(TypePath {
                alias,
                segments,
                span: Span::new(start, end),
            })
        };
        Ok((qualifier, MemberName::Named(last)))
    }

    fn parse_alias(&mut self) -> PResult<Option<Ident>> {
        let Some((word, next)) = self.lookahead_word() else {
            return Ok(None);
        };
        if !self.double_colon_at(next) {
            return Ok(None);
        }
        if !word.verbatim && keywords::is_reserved(&word.text) {
            return Err(self.error(ParseError::KeywordAsIdentifier {
                keyword: word.text,
                span: word.span.into(),
            }));
        }

        self.advance_to(next);
        self.skip_whitespace();
        // The two colons checked above.
        self.bump();
        self.bump();
        Ok(Some(word.into_ident()))
    }

    fn parse_special_member(&mut self) -> PResult<Option<MemberName>> {
        let Some((word, next)) = self.lookahead_word() else {
            return Ok(None);
        };
        if word.verbatim {
            return Ok(None);
        }

        let kind = match word.text.as_str() {
            "this" => {
                self.advance_to(next);
                return Ok(Some(MemberName::Indexer { span: word.span }));
            }
            "operator" => {
                self.advance_to(next);
                let (operator, end) = self.parse_operator_token()?;
                return Ok(Some(MemberName::Operator {
                    operator,
                    span: Span::new(word.span.start, end),
                }));
            }
            "implicit" => ConversionKind::Implicit,
            "explicit" => ConversionKind::Explicit,
            _ => return Ok(None),
        };

        self.advance_to(next);
        if self.eat_keyword("operator").is_none() {
            let span = self.current_span();
            return Err(self.error(ParseError::Expected {
                expected: "operator".to_string(),
                span: span.into(),
            }));
        }
        let target = self.parse_type()?;
        Ok(Some(MemberName::Conversion {
            kind,
            span: Span::new(word.span.start, target.span().end),
            target: Box::new(target),
        }))
    }

    fn parse_operator_token(&mut self) -> PResult<(OverloadableOperator, u32)> {
        self.skip_whitespace();
        let missing = self.current_span();

        if let Some((word, next)) = self.lookahead_word() {
            let operator = (!word.verbatim)
                .then(|| OverloadableOperator::from_token(&word.text))
                .flatten();
            return match operator {
                Some(operator) => {
                    self.advance_to(next);
                    Ok((operator, word.span.end))
                }
                None => Err(self.error(ParseError::OverloadableOperatorExpected {
                    span: word.span.into(),
                })),
            };
        }

        let start = self.offset();
        let mut token = String::new();
        while let Some(ch) = self.peek() {
            let ch = match ch {
                '{' => '<',
                '}' => '>',
                other => other,
            };
            if !OPERATOR_CHARS.contains(ch) {
                break;
            }
            token.push(ch);
            self.bump();
        }

        match OverloadableOperator::from_token(&token) {
            Some(operator) => Ok((operator, self.last_end)),
            None => {
                let span = if token.is_empty() {
                    missing
                } else {
                    Span::new(start, self.last_end)
                };
                Err(self.error(ParseError::OverloadableOperatorExpected { span: span.into() }))
            }
        }
    }

    // Segments and types

    fn parse_segment(&mut self, allow_predefined: bool, declaring: bool) -> PResult<Segment> {
        let name = self.parse_segment_name(allow_predefined)?;
        let type_arguments = self.parse_type_argument_list(declaring)?;
        let end = type_arguments
            .as_ref()
            .map_or(name.span().end, |list| list.span.end);
        Ok(Segment {
            span: Span::new(name.span().start, end),
            name,
            type_arguments,
        })
    }

    fn parse_segment_name(&mut self, allow_predefined: bool) -> PResult<SegmentName> {
        let Some(word) = self.scan_word()? else {
            let span = self.current_span();
            return Err(self.error(ParseError::IdentifierExpected { span: span.into() }));
        };

        if !word.verbatim {
            if let Some(ty) = PredefinedType::from_keyword(&word.text) {
                if allow_predefined {
                    return Ok(SegmentName::Predefined {
                        ty,
                        span: word.span,
                    });
                }
            }
            if keywords::is_reserved(&word.text) {
                return Err(self.error(ParseError::KeywordAsIdentifier {
                    keyword: word.text,
                    span: word.span.into(),
                }));
            }
        }

        Ok(SegmentName::Ident(word.into_ident()))
    }

    /// Parse a `{...}` list; in a declaring position every argument should be a bare
    /// identifier naming a new placeholder
    fn parse_type_argument_list(&mut self, declaring: bool) -> PResult<Option<TypeArgumentList>> {
        self.skip_whitespace();
        let Some(open) = self.peek().filter(|ch| matches!(ch, '{' | '<')) else {
            return Ok(None);
        };
        let close = if open == '{' { '}' } else { '>' };
        let start = self.offset();
        self.bump();

        let mut arguments = Vec::new();
        loop {
            self.skip_whitespace();
            if declaring && self.lookahead_word().is_none() && self.peek() != Some('@') {
                let span = self.current_span();
                return Err(self.error(ParseError::IdentifierExpected { span: span.into() }));
            }
            let ty = self.parse_type()?;
            let placeholder = match &ty {
                TypeRef::Path(path) if declaring => path.simple_name().cloned(),
                _ => None,
            };
            let argument = match placeholder {
                Some(ident) => TypeArgument::Placeholder(ident),
                None => {
                    if declaring {
                        self.recoverable(ParseError::TypeParameterNotIdentifier {
                            span: ty.span().into(),
                        });
                    }
                    TypeArgument::Type(ty)
                }
            };
            arguments.push(argument);

            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.bump(),
                Some('}' | '>') => {
                    self.bump();
                    break;
                }
                _ => {
                    let span = self.current_span();
                    return Err(self.error(ParseError::Expected {
                        expected: close.to_string(),
                        span: span.into(),
                    }));
                }
            }
        }

        Ok(Some(TypeArgumentList {
            arguments,
            span: Span::new(start, self.last_end),
        }))
    }

    fn parse_type(&mut self) -> PResult<TypeRef> {
        self.skip_whitespace();
        let start = self.offset();
        let mut ty = self.parse_named_type()?;

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('*') => {
                    self.bump();
                    ty = TypeRef::Pointer {
                        pointee: Box::new(ty),
                        span: Span::new(start, self.last_end),
                    };
                }
                Some('?') => {
                    self.bump();
                    ty = TypeRef::Nullable {
                        underlying: Box::new(ty),
                        span: Span::new(start, self.last_end),
                    };
                }
                Some('[') => {
                    let Some(ranks) = self.rank_specifiers() else {
                        break;
                    };
                    // `T[][,]` is an array of `T[,]`: the first specifier is outermost.
                    let mut element = ty;
                    for rank in ranks.into_iter().rev() {
                        element = TypeRef::Array {
                            element: Box::new(element),
                            rank,
                            span: Span::new(start, self.last_end),
                        };
                    }
                    ty = element;
                }
                _ => break,
            }
        }

        Ok(ty)
    }

    /// Consume consecutive `[,]` specifiers, returning their ranks, or nothing if the
    /// `[` does not start one
    fn rank_specifiers(&mut self) -> Option<Vec<u32>> {
        let mut ranks = Vec::new();
        loop {
            let mut pos = self.skip_whitespace_from(self.pos);
            if self.chars.get(pos).map(|decoded| decoded.ch) != Some('[') {
                break;
            }
            pos += 1;
            let mut rank = 1;
            loop {
                pos = self.skip_whitespace_from(pos);
                match self.chars.get(pos).map(|decoded| decoded.ch) {
                    Some(',') => rank += 1,
                    Some(']') => break,
                    _ => return (!ranks.is_empty()).then_some(ranks),
                }
                pos += 1;
            }
            self.advance_to(pos + 1);
            ranks.push(rank);
        }
        (!ranks.is_empty()).then_some(ranks)
    }

    fn parse_named_type(&mut self) -> PResult<TypeRef> {
        self.skip_whitespace();
        let start = self.offset();

        match self.lookahead_word() {
            Some((word, next)) if word.is_keyword("dynamic") && !self.continues_path(next) => {
                self.advance_to(next);
                return Ok(TypeRef::Dynamic(word.span));
            }
            Some(_) => {}
            None if self.peek() == Some('@') => {}
            None => {
                let span = self.current_span();
                return Err(self.error(ParseError::TypeExpected { span: span.into() }));
            }
        }

        let alias = self.parse_alias()?;
        let mut segments = Vec::new();
        loop {
            let allow_predefined = segments.is_empty() && alias.is_none();
            let segment = self.parse_segment(allow_predefined, false)?;
            let predefined = matches!(segment.name, SegmentName::Predefined { .. });
            segments.push(segment);
            if predefined || !self.at_char('.') {
                break;
            }
            self.bump();
        }

        Ok(TypeRef::Path(TypePath {
            alias,
            segments,
            span: Span::new(start, self.last_end),
        }))
    }

    fn continues_path(&self, pos: usize) -> bool {
        let pos = self.skip_whitespace_from(pos);
        self.chars
            .get(pos)
            .is_some_and(|decoded| matches!(decoded.ch, '.' | '{' | '<' | ':'))
    }

    // Parameters

    fn parse_parameters_for(&mut self, member: &MemberName) -> PResult<Option<ParameterList>> {
        let (open, close) = match member {
            MemberName::Indexer { .. } => ('[', ']'),
            _ => ('(', ')'),
        };
        if !self.at_char(open) {
            return Ok(None);
        }
        let start = self.offset();
        self.bump();

        let mut parameters = Vec::new();
        if self.at_char(close) {
            self.bump();
            return Ok(Some(ParameterList {
                parameters,
                span: Span::new(start, self.last_end),
            }));
        }

        loop {
            parameters.push(self.parse_parameter()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.bump(),
                Some(ch) if ch == close => {
                    self.bump();
                    break;
                }
                _ => {
                    let span = self.current_span();
                    return Err(self.error(ParseError::Expected {
                        expected: close.to_string(),
                        span: span.into(),
                    }));
                }
            }
        }

        Ok(Some(ParameterList {
            parameters,
            span: Span::new(start, self.last_end),
        }))
    }

    fn parse_parameter(&mut self) -> PResult<Parameter> {
        self.skip_whitespace();
        let start = self.offset();
        let ref_kind = self.parse_ref_kind();
        let ty = self.parse_type()?;
        Ok(Parameter {
            ref_kind,
            span: Span::new(start, ty.span().end),
            ty,
        })
    }

    fn parse_ref_kind(&mut self) -> RefKind {
        self.skip_whitespace();
        let start = self.offset();

        if self.eat_keyword("ref").is_some() {
            return match self.eat_keyword("readonly") {
                Some(readonly) => self.ref_readonly(Span::new(start, readonly.end)),
                None => RefKind::Ref,
            };
        }
        if self.eat_keyword("out").is_some() {
            return RefKind::Out;
        }
        if self.eat_keyword("in").is_some() {
            return RefKind::In;
        }

        let readonly_ref = self.lookahead_word().and_then(|(first, next)| {
            let (second, after) = self.word_at(next)?;
            (first.is_keyword("readonly") && second.is_keyword("ref"))
                .then_some((second.span, after))
        });
        if let Some((ref_span, after)) = readonly_ref {
            self.advance_to(after);
            return self.ref_readonly(Span::new(start, ref_span.end));
        }

        RefKind::None
    }

    fn ref_readonly(&mut self, span: Span) -> RefKind {
        if !self.options.ref_readonly_parameters {
            self.recoverable(ParseError::RefReadonlyUnavailable { span: span.into() });
            self.drop_parameters = true;
        }
        RefKind::RefReadonly
    }
}

fn build_tree(
    qualifier: Option<TypePath>,
    member: MemberName,
    parameters: Option<ParameterList>,
    span: Span,
) -> ReferenceTree {
    match (member, parameters) {
        (MemberName::Named(last), None) => {
            let (alias, mut segments) = qualifier
                .map(|qualifier| (qualifier.alias, qualifier.segments))
                .unwrap_or_default();
            segments.push(last);
            ReferenceTree::TypeOrNamespace(TypePath {
                alias,
                segments,
                span,
            })
        }
        (member, parameters) => ReferenceTree::Member(MemberReference {
            qualifier,
            member,
            parameters,
            span,
        }),
    }
}
