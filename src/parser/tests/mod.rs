//! Grammar and recovery tests over the CST.

mod alternations;
