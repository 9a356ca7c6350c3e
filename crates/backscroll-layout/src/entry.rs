#![forbid(unsafe_code)]

//! Per-variant entry layout.
//!
//! [`layout_message`] is the single source of truth for entry geometry:
//! one pass over the message emits positioned draw operations and the
//! total height together in a [`DrawPlan`]. Hosts reserve `plan.height`
//! and replay `plan.ops`; there is no separate measuring pass to drift
//! out of sync.
//!
//! # Invariants
//!
//! 1. Plan height and op positions come from the same traversal.
//! 2. Font state on the measurer is reset at the start of every call;
//!    grow/shrink inside one message never leak into the next.
//! 3. Structural variants (`Divider`, `Ellipsis`) carry no padding;
//!    interactive variants are padded on all four sides.
//!
//! # Failure Modes
//!
//! - An unready face portrait degrades to text-only layout for the whole
//!   entry; no leading block is reserved.
//! - An item reference the catalog cannot name lays out as the cancel
//!   label, exactly like a cancelled pick.

use backscroll_core::{ColorId, FaceRef, Message, Token};

use crate::plan::{DrawOp, DrawPlan};
use crate::surface::{AssetCatalog, TextMeasure};

/// Label synthesized for the cancel pseudo-option and cancelled picks.
pub const CANCEL_LABEL: &str = "(cancel)";

/// Geometry and palette parameters for entry layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Inner drawable width available to every entry.
    pub content_width: f32,
    /// Padding around interactive entries, all four sides.
    pub padding: f32,
    /// Vertical gap added below every text line.
    pub line_gap: f32,
    /// Horizontal slack added after an inline icon cell.
    pub icon_pad: f32,
    /// Leading block reserved for a face portrait column.
    pub face_block_width: f32,
    /// Inter-option gap for choice rows.
    pub choice_gap: f32,
    /// Height of the divider rule.
    pub rule_height: f32,
    /// Default text palette index.
    pub text_color: ColorId,
    /// Palette index for the picked option.
    pub emphasis_color: ColorId,
    /// Palette index for an unchosen cancel pseudo-option.
    pub muted_color: ColorId,
    /// Palette index for the divider rule.
    pub rule_color: ColorId,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            content_width: 780.0,
            padding: 18.0,
            line_gap: 8.0,
            icon_pad: 4.0,
            face_block_width: 168.0,
            choice_gap: 16.0,
            rule_height: 2.0,
            text_color: ColorId(0),
            emphasis_color: ColorId(16),
            muted_color: ColorId(8),
            rule_color: ColorId(7),
        }
    }
}

impl LayoutConfig {
    /// Config for the given inner width with default spacing and palette.
    #[must_use]
    pub fn new(content_width: f32) -> Self {
        Self {
            content_width: content_width.max(0.0),
            ..Self::default()
        }
    }

    /// Set the padding around interactive entries.
    #[must_use]
    pub fn padding(mut self, padding: f32) -> Self {
        self.padding = padding.max(0.0);
        self
    }

    /// Set the inter-option gap for choice rows.
    #[must_use]
    pub fn choice_gap(mut self, gap: f32) -> Self {
        self.choice_gap = gap.max(0.0);
        self
    }
}

/// Lay out one message into a draw plan.
///
/// Positions are relative to the entry's own top-left corner; the
/// reconciler offsets whole entries vertically, never individual ops.
pub fn layout_message(
    message: &Message,
    config: &LayoutConfig,
    measure: &mut impl TextMeasure,
    catalog: &impl AssetCatalog,
) -> DrawPlan {
    measure.reset_font();
    match message {
        Message::Text { face, tokens } => layout_text(face.as_ref(), tokens, config, measure, catalog),
        Message::Choice {
            options,
            selected,
            has_cancel,
            cancelled,
        } => layout_choice(options, *selected, *has_cancel, *cancelled, config, measure),
        Message::NumberInput { value, .. } => layout_number(*value, config, measure),
        Message::ItemChoice { item, .. } => layout_item(*item, config, measure, catalog),
        Message::Divider => layout_divider(config),
        Message::Ellipsis => layout_ellipsis(config, measure),
    }
}

fn layout_text(
    face: Option<&FaceRef>,
    tokens: &[Token],
    config: &LayoutConfig,
    measure: &mut impl TextMeasure,
    catalog: &impl AssetCatalog,
) -> DrawPlan {
    let pad = config.padding;
    let (icon_w, icon_h) = measure.icon_size();
    let icon_cell_h = icon_h + config.icon_pad;
    let mut ops = Vec::new();

    let mut x0 = pad;
    let mut face_drawn = false;
    if let Some(face) = face {
        if catalog.face_ready(face) {
            ops.push(DrawOp::Face {
                x: pad,
                y: pad,
                face: face.clone(),
            });
            x0 += config.face_block_width;
            face_drawn = true;
        }
    }

    let mut tx = x0;
    let mut ty = pad;
    let mut line_height = measure.font_size();
    let mut color = config.text_color;
    let mut line_has_text = false;

    for token in tokens {
        match token {
            Token::Run(text) => {
                line_has_text = true;
                ops.push(DrawOp::Text {
                    x: tx,
                    y: ty,
                    text: text.clone(),
                    color,
                    font_size: measure.font_size(),
                });
                tx += measure.measure(text);
            }
            Token::Newline => {
                ty += line_height + config.line_gap;
                tx = x0;
                line_has_text = false;
                line_height = measure.font_size();
            }
            Token::Color(c) => color = *c,
            Token::Icon(index) => {
                ops.push(DrawOp::Icon {
                    x: tx + 2.0,
                    y: ty + 2.0,
                    index: *index,
                });
                tx += icon_w + config.icon_pad;
                line_height = line_height.max(icon_cell_h);
            }
            Token::FontGrow => {
                measure.grow_font();
                line_height = line_height.max(measure.font_size());
            }
            Token::FontShrink => measure.shrink_font(),
        }
    }
    if line_has_text {
        ty += line_height + config.line_gap;
    }
    if face_drawn {
        let (_, face_h) = measure.face_size();
        ty = ty.max(pad + face_h + config.line_gap);
    }

    DrawPlan {
        ops,
        height: ty + pad,
    }
}

fn layout_choice(
    options: &[String],
    selected: usize,
    has_cancel: bool,
    cancelled: bool,
    config: &LayoutConfig,
    measure: &impl TextMeasure,
) -> DrawPlan {
    let pad = config.padding;
    let gap = config.choice_gap;
    let width = config.content_width;
    let font = measure.font_size();

    struct Slot<'a> {
        label: &'a str,
        width: f32,
        color: ColorId,
    }

    let total = options.len() + usize::from(has_cancel);
    let mut slots = Vec::with_capacity(total);
    for idx in 0..total {
        let cancel_slot = has_cancel && idx == total - 1;
        let label = if cancel_slot {
            CANCEL_LABEL
        } else {
            options[idx].as_str()
        };
        let color = if (!cancelled && idx == selected) || (cancel_slot && cancelled) {
            config.emphasis_color
        } else if cancel_slot {
            config.muted_color
        } else {
            config.text_color
        };
        slots.push(Slot {
            label,
            width: measure.measure(label),
            color,
        });
    }

    // Greedy row packing: an option that would overflow the row budget
    // starts a new row.
    let row_budget = width - gap;
    let mut rows: Vec<Vec<Slot>> = Vec::new();
    let mut row: Vec<Slot> = Vec::new();
    let mut running = 0.0;
    for slot in slots {
        running += slot.width + gap;
        if running > row_budget && !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            running = slot.width + gap;
        }
        row.push(slot);
    }
    if !row.is_empty() {
        rows.push(row);
    }

    // Leftover row width spreads as equal inter-option spans.
    let mut ops = Vec::new();
    let mut ty = pad;
    for row in &rows {
        let n = row.len() as f32;
        let occupied: f32 =
            row.iter().map(|s| s.width + gap).sum::<f32>() + gap * (row.len() + 1) as f32;
        let span = (width - occupied - gap) / n;
        let mut tx = pad + gap;
        for slot in row {
            ops.push(DrawOp::Text {
                x: tx + (slot.width + span) / 2.0,
                y: ty,
                text: slot.label.to_string(),
                color: slot.color,
                font_size: font,
            });
            tx += slot.width + gap + span;
        }
        ty += font + config.line_gap;
    }

    DrawPlan {
        ops,
        height: ty + pad,
    }
}

fn layout_number(value: i64, config: &LayoutConfig, measure: &impl TextMeasure) -> DrawPlan {
    let pad = config.padding;
    let text = value.to_string();
    let text_width = measure.measure(&text);
    let font = measure.font_size();
    DrawPlan {
        ops: vec![DrawOp::Text {
            x: pad + config.content_width - text_width,
            y: pad,
            text,
            color: config.text_color,
            font_size: font,
        }],
        height: pad + font + config.line_gap + pad,
    }
}

fn layout_item(
    item: Option<backscroll_core::ItemRef>,
    config: &LayoutConfig,
    measure: &impl TextMeasure,
    catalog: &impl AssetCatalog,
) -> DrawPlan {
    let pad = config.padding;
    let font = measure.font_size();
    let resolved = item.and_then(|item| catalog.item_name(item).map(|name| (item, name)));
    match resolved {
        Some((item, name)) => {
            let (icon_w, icon_h) = measure.icon_size();
            let icon_cell = icon_w + config.icon_pad;
            let text_width = measure.measure(&name);
            let bx = pad + config.content_width - text_width - icon_cell;
            let mut ops = Vec::new();
            if let Some(index) = catalog.item_icon(item) {
                ops.push(DrawOp::Icon {
                    x: bx + 2.0,
                    y: pad + 4.0,
                    index,
                });
            }
            ops.push(DrawOp::Text {
                x: bx + icon_cell,
                y: pad + 2.0,
                text: name,
                color: config.text_color,
                font_size: font,
            });
            DrawPlan {
                ops,
                height: pad + (icon_h + config.icon_pad).max(font) + config.line_gap + pad,
            }
        }
        None => {
            let text_width = measure.measure(CANCEL_LABEL);
            DrawPlan {
                ops: vec![DrawOp::Text {
                    x: pad + config.content_width - text_width,
                    y: pad,
                    text: CANCEL_LABEL.to_string(),
                    color: config.text_color,
                    font_size: font,
                }],
                height: pad + font + config.line_gap + pad,
            }
        }
    }
}

fn layout_divider(config: &LayoutConfig) -> DrawPlan {
    DrawPlan {
        ops: vec![DrawOp::Rect {
            x: 0.0,
            y: 0.0,
            w: config.content_width,
            h: config.rule_height,
            color: config.rule_color,
        }],
        height: config.rule_height,
    }
}

fn layout_ellipsis(config: &LayoutConfig, measure: &impl TextMeasure) -> DrawPlan {
    let text_width = measure.measure("...");
    let font = measure.font_size();
    DrawPlan {
        ops: vec![DrawOp::Text {
            x: (config.content_width - text_width) / 2.0,
            y: 0.0,
            text: "...".to_string(),
            color: config.text_color,
            font_size: font,
        }],
        height: font,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{FixedMeasure, NullCatalog};
    use backscroll_core::{ItemRef, VarRef};
    use proptest::prelude::*;

    // FixedMeasure at the default 28pt: 14.0 per display column.
    const COL: f32 = 14.0;
    const LINE: f32 = 36.0; // 28 font + 8 gap
    const PAD: f32 = 18.0;

    struct TestCatalog {
        face_ready: bool,
    }

    impl AssetCatalog for TestCatalog {
        fn item_name(&self, item: ItemRef) -> Option<String> {
            (item.0 == 1).then(|| "Potion".to_string())
        }

        fn item_icon(&self, item: ItemRef) -> Option<u32> {
            (item.0 == 1).then_some(176)
        }

        fn face_ready(&self, _face: &FaceRef) -> bool {
            self.face_ready
        }
    }

    fn text_message(tokens: Vec<Token>) -> Message {
        Message::Text { face: None, tokens }
    }

    fn layout(message: &Message) -> DrawPlan {
        let mut measure = FixedMeasure::default();
        layout_message(message, &LayoutConfig::default(), &mut measure, &NullCatalog)
    }

    #[test]
    fn single_run_is_one_padded_line() {
        let plan = layout(&text_message(vec![Token::Run("hi".into())]));
        assert_eq!(plan.height, PAD + LINE + PAD);
        assert_eq!(
            plan.ops,
            vec![DrawOp::Text {
                x: PAD,
                y: PAD,
                text: "hi".into(),
                color: ColorId(0),
                font_size: 28.0,
            }]
        );
    }

    #[test]
    fn newline_advances_and_resets_cursor() {
        let plan = layout(&text_message(vec![
            Token::Run("a".into()),
            Token::Newline,
            Token::Run("b".into()),
        ]));
        assert_eq!(plan.height, PAD + 2.0 * LINE + PAD);
        match &plan.ops[1] {
            DrawOp::Text { x, y, .. } => {
                assert_eq!(*x, PAD);
                assert_eq!(*y, PAD + LINE);
            }
            op => panic!("expected text op, got {op:?}"),
        }
    }

    #[test]
    fn trailing_newline_adds_no_extra_line() {
        let one = layout(&text_message(vec![Token::Run("a".into())]));
        let with_newline = layout(&text_message(vec![Token::Run("a".into()), Token::Newline]));
        assert_eq!(one.height, with_newline.height);
    }

    #[test]
    fn icon_raises_line_height_and_advances_cursor() {
        let plan = layout(&text_message(vec![Token::Run("a".into()), Token::Icon(5)]));
        // icon cell 32 + 4 pad beats the 28pt font
        assert_eq!(plan.height, PAD + (36.0 + 8.0) + PAD);
        match &plan.ops[1] {
            DrawOp::Icon { x, y, index } => {
                assert_eq!(*x, PAD + COL + 2.0);
                assert_eq!(*y, PAD + 2.0);
                assert_eq!(*index, 5);
            }
            op => panic!("expected icon op, got {op:?}"),
        }
    }

    #[test]
    fn font_grow_affects_line_height_and_later_runs() {
        let plan = layout(&text_message(vec![
            Token::FontGrow,
            Token::Run("a".into()),
        ]));
        assert_eq!(plan.height, PAD + (40.0 + 8.0) + PAD);
        match &plan.ops[0] {
            DrawOp::Text { font_size, x, .. } => {
                assert_eq!(*font_size, 40.0);
                assert_eq!(*x, PAD);
            }
            op => panic!("expected text op, got {op:?}"),
        }
    }

    #[test]
    fn font_state_does_not_leak_between_messages() {
        let mut measure = FixedMeasure::default();
        let config = LayoutConfig::default();
        let grown = text_message(vec![Token::FontGrow, Token::Run("a".into())]);
        layout_message(&grown, &config, &mut measure, &NullCatalog);
        let plain = layout_message(
            &text_message(vec![Token::Run("a".into())]),
            &config,
            &mut measure,
            &NullCatalog,
        );
        assert_eq!(plain.height, PAD + LINE + PAD);
    }

    #[test]
    fn color_token_restyles_following_runs() {
        let plan = layout(&text_message(vec![
            Token::Run("a".into()),
            Token::Color(ColorId(2)),
            Token::Run("b".into()),
        ]));
        match (&plan.ops[0], &plan.ops[1]) {
            (DrawOp::Text { color: c0, .. }, DrawOp::Text { color: c1, .. }) => {
                assert_eq!(*c0, ColorId(0));
                assert_eq!(*c1, ColorId(2));
            }
            ops => panic!("expected two text ops, got {ops:?}"),
        }
    }

    #[test]
    fn ready_face_reserves_leading_block_and_floors_height() {
        let message = Message::Text {
            face: Some(FaceRef::new("hero", 1)),
            tokens: vec![Token::Run("hi".into())],
        };
        let mut measure = FixedMeasure::default();
        let plan = layout_message(
            &message,
            &LayoutConfig::default(),
            &mut measure,
            &TestCatalog { face_ready: true },
        );
        assert!(matches!(plan.ops[0], DrawOp::Face { x, y, .. } if x == PAD && y == PAD));
        match &plan.ops[1] {
            DrawOp::Text { x, .. } => assert_eq!(*x, PAD + 168.0),
            op => panic!("expected text op, got {op:?}"),
        }
        // one 36pt line of text, but the 144pt portrait floors the height
        assert_eq!(plan.height, PAD + 144.0 + 8.0 + PAD);
    }

    #[test]
    fn unready_face_degrades_to_text_only() {
        let message = Message::Text {
            face: Some(FaceRef::new("hero", 1)),
            tokens: vec![Token::Run("hi".into())],
        };
        let mut measure = FixedMeasure::default();
        let plan = layout_message(
            &message,
            &LayoutConfig::default(),
            &mut measure,
            &TestCatalog { face_ready: false },
        );
        assert_eq!(plan.height, PAD + LINE + PAD);
        assert!(!plan.ops.iter().any(|op| matches!(op, DrawOp::Face { .. })));
    }

    #[test]
    fn choice_single_row_spreads_leftover_width() {
        let message = Message::Choice {
            options: vec!["yes".into(), "no".into()],
            selected: 0,
            has_cancel: false,
            cancelled: false,
        };
        let plan = layout(&message);
        assert_eq!(plan.height, PAD + LINE + PAD);
        // widths 42 and 28; occupied = (42+16)+(28+16) + 16×3 = 150
        let span = (780.0 - 150.0 - 16.0) / 2.0;
        match &plan.ops[0] {
            DrawOp::Text { x, color, .. } => {
                assert_eq!(*x, PAD + 16.0 + (42.0 + span) / 2.0);
                assert_eq!(*color, ColorId(16));
            }
            op => panic!("expected text op, got {op:?}"),
        }
        match &plan.ops[1] {
            DrawOp::Text { color, .. } => assert_eq!(*color, ColorId(0)),
            op => panic!("expected text op, got {op:?}"),
        }
    }

    #[test]
    fn choice_wraps_when_row_budget_exceeded() {
        let message = Message::Choice {
            options: vec!["alpha".into(), "beta".into(), "gamma".into()],
            selected: 1,
            has_cancel: false,
            cancelled: false,
        };
        let mut measure = FixedMeasure::default();
        // Room for roughly one option per row.
        let config = LayoutConfig::new(120.0);
        let plan = layout_message(&message, &config, &mut measure, &NullCatalog);
        assert_eq!(plan.height, PAD + 3.0 * LINE + PAD);
    }

    #[test]
    fn cancel_slot_muted_unless_cancelled() {
        let message = Message::Choice {
            options: vec!["go".into()],
            selected: 0,
            has_cancel: true,
            cancelled: false,
        };
        let plan = layout(&message);
        let colors: Vec<ColorId> = plan
            .ops
            .iter()
            .map(|op| match op {
                DrawOp::Text { color, .. } => *color,
                op => panic!("expected text op, got {op:?}"),
            })
            .collect();
        assert_eq!(colors, vec![ColorId(16), ColorId(8)]);
    }

    #[test]
    fn cancelled_choice_emphasizes_cancel_slot() {
        let message = Message::Choice {
            options: vec!["go".into()],
            selected: 0,
            has_cancel: true,
            cancelled: true,
        };
        let plan = layout(&message);
        let texts: Vec<(&str, ColorId)> = plan
            .ops
            .iter()
            .map(|op| match op {
                DrawOp::Text { text, color, .. } => (text.as_str(), *color),
                op => panic!("expected text op, got {op:?}"),
            })
            .collect();
        assert_eq!(texts, vec![("go", ColorId(0)), (CANCEL_LABEL, ColorId(16))]);
    }

    #[test]
    fn number_input_right_aligned_single_line() {
        let message = Message::NumberInput {
            variable: VarRef(3),
            value: 42,
        };
        let plan = layout(&message);
        assert_eq!(plan.height, PAD + LINE + PAD);
        match &plan.ops[0] {
            DrawOp::Text { x, text, .. } => {
                assert_eq!(text, "42");
                assert_eq!(*x, PAD + 780.0 - 2.0 * COL);
            }
            op => panic!("expected text op, got {op:?}"),
        }
    }

    #[test]
    fn item_choice_draws_icon_and_name_right_aligned() {
        let message = Message::ItemChoice {
            item: Some(ItemRef(1)),
            variable: VarRef(3),
        };
        let mut measure = FixedMeasure::default();
        let plan = layout_message(
            &message,
            &LayoutConfig::default(),
            &mut measure,
            &TestCatalog { face_ready: false },
        );
        // icon cell 36 beats the 28pt font
        assert_eq!(plan.height, PAD + 36.0 + 8.0 + PAD);
        let name_width = 6.0 * COL;
        let bx = PAD + 780.0 - name_width - 36.0;
        assert!(matches!(plan.ops[0], DrawOp::Icon { index: 176, x, .. } if x == bx + 2.0));
        match &plan.ops[1] {
            DrawOp::Text { x, text, .. } => {
                assert_eq!(text, "Potion");
                assert_eq!(*x, bx + 36.0);
            }
            op => panic!("expected text op, got {op:?}"),
        }
    }

    #[test]
    fn cancelled_item_choice_shows_cancel_label() {
        let message = Message::ItemChoice {
            item: None,
            variable: VarRef(3),
        };
        let plan = layout(&message);
        assert_eq!(plan.height, PAD + LINE + PAD);
        match &plan.ops[0] {
            DrawOp::Text { text, .. } => assert_eq!(text, CANCEL_LABEL),
            op => panic!("expected text op, got {op:?}"),
        }
    }

    #[test]
    fn unresolvable_item_degrades_to_cancel_label() {
        let message = Message::ItemChoice {
            item: Some(ItemRef(99)),
            variable: VarRef(3),
        };
        let mut measure = FixedMeasure::default();
        let plan = layout_message(
            &message,
            &LayoutConfig::default(),
            &mut measure,
            &TestCatalog { face_ready: false },
        );
        match &plan.ops[0] {
            DrawOp::Text { text, .. } => assert_eq!(text, CANCEL_LABEL),
            op => panic!("expected text op, got {op:?}"),
        }
    }

    #[test]
    fn divider_is_unpadded_rule() {
        let plan = layout(&Message::Divider);
        assert_eq!(plan.height, 2.0);
        assert_eq!(
            plan.ops,
            vec![DrawOp::Rect {
                x: 0.0,
                y: 0.0,
                w: 780.0,
                h: 2.0,
                color: ColorId(7),
            }]
        );
    }

    #[test]
    fn ellipsis_is_centered_one_font_tall() {
        let plan = layout(&Message::Ellipsis);
        assert_eq!(plan.height, 28.0);
        match &plan.ops[0] {
            DrawOp::Text { x, text, .. } => {
                assert_eq!(text, "...");
                assert_eq!(*x, (780.0 - 3.0 * COL) / 2.0);
            }
            op => panic!("expected text op, got {op:?}"),
        }
    }

    proptest! {
        /// Text op baselines never move upward within one entry.
        #[test]
        fn text_ops_are_top_to_bottom(
            lines in proptest::collection::vec("[a-z]{0,8}", 1..8),
        ) {
            let mut tokens = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                if i > 0 {
                    tokens.push(Token::Newline);
                }
                if !line.is_empty() {
                    tokens.push(Token::Run(line.clone()));
                }
            }
            let plan = layout(&text_message(tokens));
            let ys: Vec<f32> = plan
                .ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text { y, .. } => Some(*y),
                    _ => None,
                })
                .collect();
            prop_assert!(ys.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(plan.height >= 2.0 * PAD);
        }

        /// Height equals padded line count for plain multi-line text.
        #[test]
        fn plain_text_height_counts_lines(line_count in 1usize..12) {
            let mut tokens = Vec::new();
            for i in 0..line_count {
                if i > 0 {
                    tokens.push(Token::Newline);
                }
                tokens.push(Token::Run("x".into()));
            }
            let plan = layout(&text_message(tokens));
            prop_assert_eq!(plan.height, PAD + line_count as f32 * LINE + PAD);
        }
    }
}
