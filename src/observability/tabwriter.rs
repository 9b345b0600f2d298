//! Elastic tab-stop alignment.
//!
//! Text is split into lines and tab-terminated cells. Adjacent lines that
//! share a column form a block, and every cell in a block is padded to the
//! widest cell of that block plus `padding`, but never below `min_width`.
//! The final cell of a line is not tab-terminated and is never padded.
//!
//! With `pad_char == '\t'` the padding is emitted as tabs and column widths
//! are rounded up to multiples of `tab_width`, so the output still aligns in a
//! terminal with matching tab stops.

/// Alignment parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabLayout {
    pub min_width: usize,
    pub tab_width: usize,
    pub padding: usize,
    pub pad_char: char,
}

impl Default for TabLayout {
    fn default() -> Self {
        Self {
            min_width: 8,
            tab_width: 8,
            padding: 1,
            pad_char: '\t',
        }
    }
}

impl TabLayout {
    /// Same layout, padded with spaces.
    pub fn with_spaces(self) -> Self {
        Self {
            pad_char: ' ',
            ..self
        }
    }

    /// Align `text`, preserving its line structure.
    pub fn align(&self, text: &str) -> String {
        let lines: Vec<Vec<&str>> = text
            .split('\n')
            .map(|line| line.split('\t').collect())
            .collect();

        let mut out = String::with_capacity(text.len() + 16);
        let mut widths = Vec::new();
        self.format(&lines, &mut widths, 0, lines.len(), &mut out);
        out
    }

    fn format(
        &self,
        lines: &[Vec<&str>],
        widths: &mut Vec<usize>,
        mut line0: usize,
        line1: usize,
        out: &mut String,
    ) {
        let column = widths.len();
        let mut this = line0;

        while this < line1 {
            if column + 1 >= lines[this].len() {
                this += 1;
                continue;
            }

            // Flush lines above the block, then size the block's column.
            self.write_lines(lines, widths, line0, this, out);
            line0 = this;

            let mut width = self.min_width;
            while this < line1 && column + 1 < lines[this].len() {
                width = width.max(cell_width(lines[this][column]) + self.padding);
                this += 1;
            }

            widths.push(width);
            self.format(lines, widths, line0, this, out);
            widths.pop();
            line0 = this;
        }

        self.write_lines(lines, widths, line0, line1, out);
    }

    fn write_lines(
        &self,
        lines: &[Vec<&str>],
        widths: &[usize],
        line0: usize,
        line1: usize,
        out: &mut String,
    ) {
        for (i, cells) in lines.iter().enumerate().take(line1).skip(line0) {
            for (j, cell) in cells.iter().enumerate() {
                out.push_str(cell);
                if let Some(&width) = widths.get(j) {
                    self.pad(out, cell_width(cell), width);
                }
            }
            if i + 1 < lines.len() {
                out.push('\n');
            }
        }
    }

    fn pad(&self, out: &mut String, text_width: usize, cell_width: usize) {
        if self.pad_char == '\t' {
            if self.tab_width == 0 {
                return;
            }
            let cell_width = cell_width.div_ceil(self.tab_width) * self.tab_width;
            let tabs = (cell_width - text_width).div_ceil(self.tab_width);
            out.extend(std::iter::repeat('\t').take(tabs));
        } else {
            out.extend(std::iter::repeat(self.pad_char).take(cell_width - text_width));
        }
    }
}

fn cell_width(cell: &str) -> usize {
    cell.chars().count()
}
