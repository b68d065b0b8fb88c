//! A vector's shared selection: either the identity (every slot 0..len
//! selected) or an explicit filtered position list (§4.4 vector operations).

#[derive(Debug, Clone)]
pub enum SelectionVector {
    /// Every position in `0..len` is selected, in order.
    Identity(usize),
    /// Exactly these positions are selected, in this order.
    Filtered(Vec<u32>),
}

impl SelectionVector {
    pub fn identity(len: usize) -> Self {
        SelectionVector::Identity(len)
    }

    pub fn filtered(positions: Vec<u32>) -> Self {
        SelectionVector::Filtered(positions)
    }

    pub fn selected_size(&self) -> usize {
        match self {
            SelectionVector::Identity(len) => *len,
            SelectionVector::Filtered(v) => v.len(),
        }
    }

    pub fn selected_positions(&self) -> Vec<u32> {
        match self {
            SelectionVector::Identity(len) => (0..*len as u32).collect(),
            SelectionVector::Filtered(v) => v.clone(),
        }
    }

    pub fn get(&self, i: usize) -> u32 {
        match self {
            SelectionVector::Identity(_) => i as u32,
            SelectionVector::Filtered(v) => v[i],
        }
    }
}
