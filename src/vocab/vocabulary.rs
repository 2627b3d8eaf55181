//! A single token<->index bijection.

use std::collections::HashMap;

use crate::error::{Result, SongsmithError};

/// Fixed-size bijection between token strings and dense indices `0..len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    token_to_index: HashMap<String, usize>,
    index_to_token: Vec<String>,
}

impl Vocabulary {
    /// Builds a vocabulary from tokens listed in index order.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index_to_token: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut token_to_index = HashMap::with_capacity(index_to_token.len());

        for (index, token) in index_to_token.iter().enumerate() {
            if token_to_index.insert(token.clone(), index).is_some() {
                return Err(SongsmithError::artifact_load_failed(format!(
                    "duplicate token {:?} in vocabulary",
                    token
                )));
            }
        }

        Ok(Self {
            token_to_index,
            index_to_token,
        })
    }

    /// Builds a vocabulary from the two mappings the training phase exported.
    ///
    /// Fails unless the mappings are inverse to each other and the indices
    /// are exactly `0..len`.
    pub fn from_mappings(
        name: &str,
        token_to_index: HashMap<String, usize>,
        index_to_token: HashMap<usize, String>,
    ) -> Result<Self> {
        let len = index_to_token.len();
        if token_to_index.len() != len {
            return Err(SongsmithError::artifact_load_failed(format!(
                "{} vocabulary: {} tokens map to indices but {} indices map to tokens",
                name,
                token_to_index.len(),
                len
            )));
        }

        let mut ordered = Vec::with_capacity(len);
        for index in 0..len {
            let token = index_to_token.get(&index).ok_or_else(|| {
                SongsmithError::artifact_load_failed(format!(
                    "{} vocabulary: index {} missing (indices must be 0..{})",
                    name, index, len
                ))
            })?;

            if token_to_index.get(token) != Some(&index) {
                return Err(SongsmithError::artifact_load_failed(format!(
                    "{} vocabulary: token {:?} does not map back to index {}",
                    name, token, index
                )));
            }
            ordered.push(token.clone());
        }

        Ok(Self {
            token_to_index,
            index_to_token: ordered,
        })
    }

    /// Returns the index of a token, if it is in the vocabulary.
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.token_to_index.get(token).copied()
    }

    /// Returns the token at an index, if the index is in range.
    pub fn token_at(&self, index: usize) -> Option<&str> {
        self.index_to_token.get(index).map(String::as_str)
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.index_to_token.len()
    }

    /// Returns true if the vocabulary has no tokens.
    pub fn is_empty(&self) -> bool {
        self.index_to_token.is_empty()
    }
}
