#![no_main]

use arbitrary::Arbitrary;
use cellkit_cell::{Cell, CellContainer, CellKind, FOCUSED, POPUP_SLOTS, VISIBLE};
use libfuzzer_sys::fuzz_target;

const POOL: usize = 10;

#[derive(Debug, Arbitrary)]
enum Op {
    Insert { parent: u8, index: u8, child: u8 },
    Remove { cell: u8 },
    SetPopup { owner: u8, slot: u8, popup: u8 },
    ClearPopup { owner: u8, slot: u8 },
    Focus { cell: u8 },
    ClearFocus,
    Hide { cell: u8, hidden: bool },
}

fn pick(cells: &[Cell], i: u8) -> &Cell {
    &cells[usize::from(i) % cells.len()]
}

fn slot(i: u8) -> usize {
    usize::from(i) % POPUP_SLOTS.len()
}

fuzz_target!(|ops: Vec<Op>| {
    let container = CellContainer::new();
    let mut cells = vec![container.root()];
    cells.extend((1..POOL).map(|i| match i % 3 {
        0 => Cell::new(CellKind::Vertical),
        1 => Cell::text(format!("t{i}")),
        _ => Cell::new(CellKind::Horizontal),
    }));

    for op in ops.iter().take(256) {
        // Rejected requests report `Err`; only the resulting state is checked.
        match *op {
            Op::Insert { parent, index, child } => {
                let parent = pick(&cells, parent);
                let index = usize::from(index) % (parent.children().len() + 2);
                let _ = parent.children().insert(index, pick(&cells, child).clone());
            }
            Op::Remove { cell } => {
                let cell = pick(&cells, cell);
                if let Some(parent) = cell.parent() {
                    let _ = parent.children().remove_cell(cell);
                }
            }
            Op::SetPopup { owner, slot: s, popup } => {
                let popup = pick(&cells, popup).clone();
                let _ = pick(&cells, owner).set_popup(POPUP_SLOTS[slot(s)], Some(popup));
            }
            Op::ClearPopup { owner, slot: s } => {
                let _ = pick(&cells, owner).set_popup(POPUP_SLOTS[slot(s)], None);
            }
            Op::Focus { cell } => {
                let _ = pick(&cells, cell).focus();
            }
            Op::ClearFocus => {
                let _ = container.set_focused_cell(None);
            }
            Op::Hide { cell, hidden } => {
                let _ = pick(&cells, cell).set(&VISIBLE, !hidden);
            }
        }

        let mut live = Vec::new();
        let mut stack = vec![container.root()];
        while let Some(cell) = stack.pop() {
            stack.extend(cell.children().iter());
            stack.extend(cell.popups());
            live.push(cell);
        }
        for cell in &cells {
            assert_eq!(cell.is_attached(), live.contains(cell), "{cell} after {op:?}");
            if container.focused_cell().as_ref() != Some(cell) {
                assert!(!cell.get(&FOCUSED), "{cell} focused after {op:?}");
            }
        }
        if let Some(focused) = container.focused_cell() {
            assert!(focused.get(&FOCUSED));
            assert!(focused.is_attached());
        }
    }
});
