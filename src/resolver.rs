use crate::ast::*;
use crate::config::Limits;
use crate::error::{CompileError, ErrorKind};
use crate::range::Range;
use crate::serialization::{
    Definition, FontDefinition, FontStyle, ResolvedValue, ThemeDefinition,
};
use std::collections::BTreeMap;

const FLAT: &str = "FLAT";
const DEFAULT_COLOR_STEPS: usize = 3;

/// Resolves every definition against the binding table. Definitions are
/// independent: one failing definition never blocks the others, and a
/// definition that recorded any error is left out of the output.
pub fn resolve(
    bindings: &Bindings,
    definitions: &[UnresolvedDefinition],
) -> (Vec<Definition>, Vec<CompileError>) {
    resolve_with(bindings, definitions, &Limits::default())
}

/// Like [`resolve`], with explicit limits.
pub fn resolve_with(
    bindings: &Bindings,
    definitions: &[UnresolvedDefinition],
    limits: &Limits,
) -> (Vec<Definition>, Vec<CompileError>) {
    Resolver::new(bindings, limits).resolve(definitions)
}

pub struct Resolver<'a> {
    bindings: &'a Bindings,
    limits: Limits,
    // Names of the bindings being resolved right now, outermost first
    active: Vec<&'a str>,
    // Errors of the definition currently being resolved
    errors: Vec<CompileError>,
}

impl<'a> Resolver<'a> {
    pub fn new(bindings: &'a Bindings, limits: &Limits) -> Self {
        Resolver {
            bindings,
            limits: *limits,
            active: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn resolve(
        mut self,
        definitions: &'a [UnresolvedDefinition],
    ) -> (Vec<Definition>, Vec<CompileError>) {
        let mut output = Vec::new();
        let mut errors: Vec<CompileError> = Vec::new();

        for definition in definitions {
            log::trace!(
                "resolving {} '{}'",
                definition.kind.as_str(),
                definition.name
            );
            self.active.clear();

            match self.resolve_definition(definition) {
                Ok(resolved) if self.errors.is_empty() => output.push(resolved),
                Ok(_) => {}
                Err(error) => self.record(error),
            }

            for error in self.errors.drain(..) {
                if !errors.contains(&error) {
                    errors.push(error);
                }
            }
        }

        log::debug!(
            "resolved {} of {} definitions with {} errors",
            output.len(),
            definitions.len(),
            errors.len()
        );
        (output, errors)
    }

    fn record(&mut self, error: CompileError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    // === Definitions ===

    fn resolve_definition(
        &mut self,
        definition: &'a UnresolvedDefinition,
    ) -> Result<Definition, CompileError> {
        let ResolvedValue::Block(body) = self.resolve_expression(&definition.body)? else {
            return Err(CompileError::new(
                ErrorKind::DefinitionNotBlock {
                    kind: definition.kind.as_str(),
                },
                definition.body.range(),
            ));
        };

        match definition.kind {
            DefinitionKind::Theme => Ok(Definition::Theme(ThemeDefinition {
                name: definition.name.clone(),
                body,
            })),
            DefinitionKind::Font => {
                let style_range = property_range(&definition.body, "style");
                let style = match body.get("style").map(|v| font_styles(v, style_range)) {
                    Some(Ok(styles)) => Some(styles),
                    Some(Err(error)) => {
                        self.record(error);
                        None
                    }
                    None => None,
                };

                let weights_range = property_range(&definition.body, "weights");
                let weights = match body.get("weights").map(|v| font_weights(v, weights_range)) {
                    Some(Ok(weights)) => Some(weights),
                    Some(Err(error)) => {
                        self.record(error);
                        None
                    }
                    None => None,
                };

                Ok(Definition::Font(FontDefinition {
                    name: definition.name.clone(),
                    source: definition.source.clone(),
                    style,
                    weights,
                    body,
                }))
            }
        }
    }

    // === Values ===

    fn resolve_expression(
        &mut self,
        expression: &'a Expression,
    ) -> Result<ResolvedValue, CompileError> {
        match expression {
            Expression::Literal(literal) => self.resolve_literal(literal),
            Expression::Reference(reference) => self.resolve_reference(reference),
        }
    }

    fn resolve_literal(&mut self, literal: &'a Literal) -> Result<ResolvedValue, CompileError> {
        match &literal.value {
            NodeValue::String(s) => Ok(ResolvedValue::String(s.clone())),
            NodeValue::Number(n) => Ok(ResolvedValue::Number(*n)),
            NodeValue::Hex(h) => Ok(ResolvedValue::Hex(h.clone())),
            NodeValue::Group(inner) => self.resolve_expression(inner),
            NodeValue::List(items) => self.resolve_list(items),
            NodeValue::Block(properties) => self.resolve_block(properties),
        }
    }

    // A failing property is recorded and left out; the rest still resolve.
    fn resolve_block(
        &mut self,
        properties: &'a [Property],
    ) -> Result<ResolvedValue, CompileError> {
        let mut map = BTreeMap::new();
        for property in properties {
            match self.resolve_expression(&property.expression) {
                Ok(value) => {
                    map.insert(property.key.clone(), value);
                }
                Err(error) => self.record(error),
            }
        }
        Ok(ResolvedValue::Block(map))
    }

    fn resolve_list(&mut self, items: &'a [ListItem]) -> Result<ResolvedValue, CompileError> {
        let mut values = Vec::new();
        for item in items {
            let result = match item {
                ListItem::Single(expression) => self
                    .resolve_expression(expression)
                    .map(|value| values.push(value)),
                ListItem::Range(range) => self.expand_range(range, &mut values),
            };
            if let Err(error) = result {
                self.record(error);
            }
        }
        Ok(ResolvedValue::List(values))
    }

    // === References ===

    fn resolve_reference(
        &mut self,
        reference: &'a Reference,
    ) -> Result<ResolvedValue, CompileError> {
        // Names traced here stay active while the target resolves, so a
        // value that contains its own binding is caught as a cycle.
        let marker = self.active.len();
        let result = self
            .trace(reference)
            .and_then(|target| self.resolve_expression(target));
        self.active.truncate(marker);
        result
    }

    /// Follows a reference and its extenders to the literal it denotes,
    /// without resolving anything the extenders do not pass through.
    fn trace(&mut self, reference: &'a Reference) -> Result<&'a Expression, CompileError> {
        let base = self.active.len();
        let mut target = self.lookup(&reference.name, reference.range)?;
        let mut path = reference.name.clone();

        for extender in &reference.extenders {
            target = match extender {
                Extender::Accessor { name, range } => {
                    let Some(properties) = block_properties(target) else {
                        return Err(CompileError::new(
                            ErrorKind::AccessorOnNonBlock { path },
                            *range,
                        ));
                    };
                    path.push('.');
                    path.push_str(name);
                    let property = find_property(properties, name).ok_or_else(|| {
                        CompileError::new(ErrorKind::PropertyNotFound { path: path.clone() }, *range)
                    })?;
                    self.settle(&property.expression)?
                }
                Extender::Indexer { expression, range } => {
                    // The index may name bindings of this chain again, so
                    // only names from enclosing traces stay active.
                    let chain = self.active.split_off(base);
                    let index = self.resolve_expression(expression);
                    self.active.extend(chain);
                    self.index(target, &index?, &mut path, *range)?
                }
            };
        }

        Ok(target)
    }

    /// Looks a binding up and marks it active.
    fn lookup(&mut self, name: &str, range: Range) -> Result<&'a Expression, CompileError> {
        if self.active.iter().any(|active| *active == name) {
            return Err(CompileError::new(
                ErrorKind::CircularReference {
                    name: name.to_string(),
                },
                range,
            ));
        }

        if self.active.len() >= self.limits.max_reference_depth {
            return Err(CompileError::new(
                ErrorKind::ReferenceTooDeep {
                    name: name.to_string(),
                    limit: self.limits.max_reference_depth,
                },
                range,
            ));
        }

        let binding = self.bindings.get(name).ok_or_else(|| {
            CompileError::new(
                ErrorKind::ReferenceNotFound {
                    name: name.to_string(),
                },
                range,
            )
        })?;

        self.active.push(binding.name.as_str());
        self.settle(&binding.expression)
    }

    /// Unwraps groups and follows references until a non-group literal remains.
    fn settle(&mut self, expression: &'a Expression) -> Result<&'a Expression, CompileError> {
        let mut current = expression;
        loop {
            match current {
                Expression::Literal(Literal {
                    value: NodeValue::Group(inner),
                    ..
                }) => current = inner,
                Expression::Literal(_) => return Ok(current),
                Expression::Reference(reference) => return self.trace(reference),
            }
        }
    }

    fn index(
        &mut self,
        target: &'a Expression,
        index: &ResolvedValue,
        path: &mut String,
        range: Range,
    ) -> Result<&'a Expression, CompileError> {
        let not_indexable = |path: &str| {
            CompileError::new(
                ErrorKind::NotIndexable {
                    path: path.to_string(),
                    found: describe(target).to_string(),
                },
                range,
            )
        };

        match index {
            ResolvedValue::Number(n) => {
                let Some(items) = list_items(target) else {
                    return Err(not_indexable(path.as_str()));
                };
                path.push_str(&format!("[{n}]"));

                if n.fract() != 0.0 || *n < 0.0 || *n >= items.len() as f64 {
                    return Err(CompileError::new(
                        ErrorKind::IndexOutOfBounds {
                            path: path.clone(),
                            index: n.to_string(),
                            len: items.len(),
                        },
                        range,
                    ));
                }

                // Positions are only meaningful up to the first ranged item.
                let position = *n as usize;
                if items[..=position]
                    .iter()
                    .any(|item| matches!(item, ListItem::Range(_)))
                {
                    return Err(CompileError::new(
                        ErrorKind::RangedItemReference { path: path.clone() },
                        range,
                    ));
                }

                match &items[position] {
                    ListItem::Single(expression) => self.settle(expression),
                    ListItem::Range(_) => Err(CompileError::new(
                        ErrorKind::RangedItemReference { path: path.clone() },
                        range,
                    )),
                }
            }
            ResolvedValue::String(key) => {
                let Some(properties) = block_properties(target) else {
                    return Err(not_indexable(path.as_str()));
                };
                path.push_str(&format!("[{key:?}]"));
                let property = find_property(properties, key).ok_or_else(|| {
                    CompileError::new(ErrorKind::PropertyNotFound { path: path.clone() }, range)
                })?;
                self.settle(&property.expression)
            }
            other => Err(CompileError::new(
                ErrorKind::InvalidIndex {
                    found: other.kind_name().to_string(),
                },
                range,
            )),
        }
    }

    // === Ranges ===

    fn expand_range(
        &mut self,
        item: &'a RangeItem,
        out: &mut Vec<ResolvedValue>,
    ) -> Result<(), CompileError> {
        let from = self.resolve_expression(&item.from)?;
        let to = self.resolve_expression(&item.to)?;

        match (&from, &to) {
            (ResolvedValue::Number(a), ResolvedValue::Number(b)) => {
                self.check_mode(item)?;
                self.expand_numbers(*a, *b, item, out)
            }
            (ResolvedValue::Hex(a), ResolvedValue::Hex(b)) => {
                self.check_mode(item)?;
                self.expand_colors(a, b, item, out)
            }
            _ if std::mem::discriminant(&from) != std::mem::discriminant(&to) => {
                Err(CompileError::new(
                    ErrorKind::RangeKindMismatch {
                        from: from.kind_name().to_string(),
                        to: to.kind_name().to_string(),
                    },
                    item.range,
                ))
            }
            _ => Err(CompileError::new(
                ErrorKind::InvalidRangeBoundType {
                    found: from.kind_name().to_string(),
                },
                item.range,
            )),
        }
    }

    fn check_mode(&self, item: &RangeItem) -> Result<(), CompileError> {
        match item.interpolation.mode.as_deref() {
            None | Some(FLAT) => Ok(()),
            Some(mode) => Err(CompileError::new(
                ErrorKind::InvalidInterpolationMode {
                    mode: mode.to_string(),
                },
                item.range,
            )),
        }
    }

    fn steps(&self, item: &RangeItem) -> Result<Option<usize>, CompileError> {
        let Some(steps) = item.interpolation.steps else {
            return Ok(None);
        };
        if steps < 1.0 || steps.fract() != 0.0 {
            return Err(CompileError::new(
                ErrorKind::InvalidInterpolationSteps {
                    steps: steps.to_string(),
                },
                item.range,
            ));
        }
        if steps > self.limits.max_range_items as f64 {
            return Err(self.too_large(item));
        }
        Ok(Some(steps as usize))
    }

    fn too_large(&self, item: &RangeItem) -> CompileError {
        CompileError::new(
            ErrorKind::RangeTooLarge {
                limit: self.limits.max_range_items,
            },
            item.range,
        )
    }

    fn expand_numbers(
        &self,
        from: f64,
        to: f64,
        item: &RangeItem,
        out: &mut Vec<ResolvedValue>,
    ) -> Result<(), CompileError> {
        if from > to {
            return Err(CompileError::new(
                ErrorKind::InvalidRangeBounds {
                    from: from.to_string(),
                    to: to.to_string(),
                },
                item.range,
            ));
        }

        match self.steps(item)? {
            Some(steps) => {
                let divisions = if item.inclusive { steps - 1 } else { steps };
                if divisions == 0 || from == to {
                    if item.inclusive {
                        out.push(ResolvedValue::Number(from));
                    }
                    return Ok(());
                }

                let step = (to - from) / divisions as f64;
                for i in 0..steps {
                    let value = if item.inclusive && i == steps - 1 {
                        to
                    } else {
                        from + step * i as f64
                    };
                    out.push(ResolvedValue::Number(value));
                }
            }
            None => {
                let span = to - from;
                let count = if item.inclusive {
                    span.floor() + 1.0
                } else {
                    span.ceil()
                };
                if count > self.limits.max_range_items as f64 {
                    return Err(self.too_large(item));
                }
                for i in 0..count as usize {
                    out.push(ResolvedValue::Number(from + i as f64));
                }
            }
        }
        Ok(())
    }

    // The inclusive flag does not apply: `steps` colors are emitted starting
    // at `from`, and the last one stops one step short of `to`.
    fn expand_colors(
        &self,
        from: &str,
        to: &str,
        item: &RangeItem,
        out: &mut Vec<ResolvedValue>,
    ) -> Result<(), CompileError> {
        let steps = self.steps(item)?.unwrap_or(DEFAULT_COLOR_STEPS);
        let a = parse_rgb(from, item.range)?;
        let b = parse_rgb(to, item.range)?;

        for i in 0..steps {
            let channel = |c: usize| {
                let step = (f64::from(b[c]) - f64::from(a[c])) / steps as f64;
                (f64::from(a[c]) + step * i as f64).round().clamp(0.0, 255.0) as u8
            };
            out.push(ResolvedValue::Hex(format!(
                "{:02x}{:02x}{:02x}",
                channel(0),
                channel(1),
                channel(2)
            )));
        }
        Ok(())
    }
}

// === Helpers ===

fn block_properties(expression: &Expression) -> Option<&[Property]> {
    match expression {
        Expression::Literal(Literal {
            value: NodeValue::Block(properties),
            ..
        }) => Some(properties),
        _ => None,
    }
}

fn list_items(expression: &Expression) -> Option<&[ListItem]> {
    match expression {
        Expression::Literal(Literal {
            value: NodeValue::List(items),
            ..
        }) => Some(items),
        _ => None,
    }
}

/// Later duplicates win, matching how blocks resolve.
fn find_property<'p>(properties: &'p [Property], key: &str) -> Option<&'p Property> {
    properties.iter().rev().find(|p| p.key == key)
}

fn describe(expression: &Expression) -> &'static str {
    match expression {
        Expression::Literal(literal) => literal.value.kind_name(),
        Expression::Reference(_) => "a reference",
    }
}

fn property_range(body: &Expression, key: &str) -> Range {
    block_properties(body)
        .and_then(|properties| find_property(properties, key))
        .map_or_else(|| body.range(), |p| p.range)
}

fn parse_rgb(hex: &str, range: Range) -> Result<[u8; 3], CompileError> {
    let invalid = || {
        CompileError::new(
            ErrorKind::InvalidHexColor {
                value: hex.to_string(),
            },
            range,
        )
    };

    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return Err(invalid()),
    };

    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let digits = expanded.get(i * 2..i * 2 + 2).ok_or_else(invalid)?;
        *channel = u8::from_str_radix(digits, 16).map_err(|_| invalid())?;
    }
    Ok(rgb)
}

fn flatten<'v>(value: &'v ResolvedValue, out: &mut Vec<&'v ResolvedValue>) {
    match value {
        ResolvedValue::List(items) => items.iter().for_each(|item| flatten(item, out)),
        other => out.push(other),
    }
}

fn font_styles(value: &ResolvedValue, range: Range) -> Result<Vec<FontStyle>, CompileError> {
    let mut flat = Vec::new();
    flatten(value, &mut flat);

    let mut styles = Vec::new();
    for value in flat {
        let ResolvedValue::String(name) = value else {
            return Err(CompileError::new(
                ErrorKind::InvalidFontStyleValue {
                    found: format!("({}) {value}", value.kind_name()),
                },
                range,
            ));
        };
        let style = FontStyle::parse(name).ok_or_else(|| {
            CompileError::new(ErrorKind::InvalidFontStyle { value: name.clone() }, range)
        })?;
        if styles.contains(&style) {
            return Err(CompileError::new(
                ErrorKind::DuplicateFontStyle { value: name.clone() },
                range,
            ));
        }
        styles.push(style);
    }
    Ok(styles)
}

fn font_weights(value: &ResolvedValue, range: Range) -> Result<Vec<u8>, CompileError> {
    let mut flat = Vec::new();
    flatten(value, &mut flat);

    let mut weights = Vec::new();
    for value in flat {
        let ResolvedValue::Number(n) = value else {
            return Err(CompileError::new(
                ErrorKind::InvalidFontWeightValue {
                    found: format!("({}) {value}", value.kind_name()),
                },
                range,
            ));
        };
        if n.fract() != 0.0 || !(1.0..=9.0).contains(n) {
            return Err(CompileError::new(
                ErrorKind::InvalidFontWeight {
                    value: n.to_string(),
                },
                range,
            ));
        }
        let weight = *n as u8;
        if weights.contains(&weight) {
            return Err(CompileError::new(
                ErrorKind::DuplicateFontWeight {
                    value: weight.to_string(),
                },
                range,
            ));
        }
        weights.push(weight);
    }
    Ok(weights)
}
