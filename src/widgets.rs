//! A handful of stock widgets built only from the public layout API.

use crate::align::{Align, AlignX, AlignY};
use crate::bound::{format_dyn, parse_dyn, Bound, DynBound};
use crate::color::{Color, Tint};
use crate::id::NodeHash;
use crate::input::{DropDirs, DropMove};
use crate::math::CellRect;
use crate::render_commands::{CursorIcon, TextFlags, TextPrim};
use crate::text::AutoSize;
use crate::tree::{Layout, WidgetCtx};

fn pressable(base: Color) -> Tint {
    Tint::new(base, base.mix(Color::WHITE, 0.2), base.mix(Color::BLACK, 0.2))
}

/// Static label. Its width follows the text when placed in a from-child
/// column.
pub fn text(l: &mut Layout<'_>, x: i32, y: i32, w: i32, h: i32, label: &str) -> NodeHash {
    let mut node = l.add_child("Text", x, y, w, h);
    let measured = label.to_string();
    let shown = label.to_string();
    node.on_auto_resize(move |_| AutoSize::text(measured.clone()))
        .on_draw(move |r, p, env| {
            p.text(r, shown.clone(), env.palette().text, Align::new(AlignX::Left, AlignY::CenterY));
        });
    node.hash()
}

/// Clickable button; also fires on its `shortcut` key.
pub fn button<F>(l: &mut Layout<'_>, x: i32, y: i32, w: i32, h: i32, label: &str, shortcut: Option<char>, mut on_click: F) -> NodeHash
where
    F: FnMut(&mut WidgetCtx) + 'static,
{
    let mut node = l.add_child("Button", x, y, w, h);
    if let Some(key) = shortcut {
        node.props().shortcut(key);
    }
    let measured = label.to_string();
    let shown = label.to_string();
    node.on_auto_resize(move |_| AutoSize::text(measured.clone()))
        .on_draw(move |r, p, env| {
            let pal = env.palette();
            p.rounded_rect(r.cut(0.05), pressable(pal.primary), 0.2)
                .text(r, shown.clone(), pal.background, Align::CENTER)
                .cursor(r, CursorIcon::Pointer);
        })
        .on_input(move |input, ctx| {
            if input.is_clicked(1, false) || input.is_shortcut() {
                on_click(ctx);
                ctx.cmds.refresh();
            }
        });
    node.hash()
}

/// Box toggling a shared boolean, with its label to the right.
pub fn checkbox(l: &mut Layout<'_>, x: i32, y: i32, w: i32, h: i32, label: &str, value: Bound<bool>) -> NodeHash {
    let mut node = l.add_child("Checkbox", x, y, w, h);
    let shown = label.to_string();
    let drawn = value.clone();
    node.on_draw(move |r, p, env| {
        let pal = env.palette();
        let mark = CellRect::new(r.x, r.y, 1.0_f32.min(r.w), 1.0_f32.min(r.h)).cut(0.2);
        p.border(mark, pal.border, 0.05);
        if drawn.get() {
            p.rect(mark.cut(0.12), pressable(pal.primary));
        }
        let rest = CellRect::new(r.x + 1.0, r.y, (r.w - 1.0).max(0.0), r.h);
        p.text(rest, shown.clone(), pal.text, Align::new(AlignX::Left, AlignY::CenterY))
            .cursor(r, CursorIcon::Pointer);
    })
    .on_input(move |input, ctx| {
        if input.is_clicked(1, false) || input.is_shortcut() {
            let flipped = !value.get();
            value.set(flipped);
            ctx.cmds.refresh();
        }
    });
    node.hash()
}

/// Single- or multi-line text field bound to any parseable value. The host
/// owns the edit buffer while focused and reports the result on commit,
/// cancel or blur.
pub fn editbox(l: &mut Layout<'_>, x: i32, y: i32, w: i32, h: i32, value: DynBound, ghost: &str, multiline: bool) -> NodeHash {
    let mut node = l.add_child("Editbox", x, y, w, h);
    let read = value.clone();
    let drawn = value.clone();
    let ghost = ghost.to_string();
    node.on_draw(move |r, p, env| {
        let pal = env.palette();
        p.rect(r, pal.edit).border(r, pal.border, 0.03);
        let mut prim = TextPrim::new(r, format_dyn(&drawn), pal.text);
        prim.ghost = ghost.clone();
        prim.flags = TextFlags {
            multiline,
            linewrap: multiline,
            editable: true,
            selection: true,
            ..Default::default()
        };
        prim.align = if multiline {
            Align::new(AlignX::Left, AlignY::Top)
        } else {
            Align::new(AlignX::Left, AlignY::CenterY)
        };
        p.text_prim(prim).cursor(r, CursorIcon::Text);
    })
    .on_editbox(
        move || format_dyn(&read),
        move |text, _commit, ctx| {
            if parse_dyn(&value, text) {
                ctx.cmds.refresh();
            }
        },
    );
    node.hash()
}

/// Row of a reorderable list: a drag source and a vertical drop target of
/// `group`, item `index` of list `source`.
pub fn drag_item<F>(l: &mut Layout<'_>, x: i32, y: i32, w: i32, h: i32, label: &str, group: &str, source: &str, index: usize, mut on_move: F) -> NodeHash
where
    F: FnMut(&DropMove, &mut WidgetCtx) + 'static,
{
    let mut node = l.add_child("DragItem", x, y, w, h);
    node.props().drag(group, source, index).drop(group, source, index, DropDirs::VERTICAL);
    let shown = label.to_string();
    node.on_draw(move |r, p, env| {
        let pal = env.palette();
        p.rect(r.cut(0.03), Tint::new(pal.background, pal.edit, pal.edit))
            .text(r, shown.clone(), pal.text, Align::new(AlignX::Left, AlignY::CenterY))
            .cursor(r, CursorIcon::Move);
    })
    .on_drop_move(move |mv, ctx| {
        on_move(mv, ctx);
        ctx.cmds.refresh();
    });
    node.hash()
}

/// Moves `list[src_i]` as described by `mv`, within one list.
pub fn apply_move<T>(list: &mut Vec<T>, mv: &DropMove) -> bool {
    if mv.src_source != mv.dst_source || mv.src_i >= list.len() || mv.is_noop() {
        return false;
    }
    let item = list.remove(mv.src_i);
    let at = mv.target_index().min(list.len());
    list.insert(at, item);
    true
}
