use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IErc20Factory {
        function createErc20(
            string name,
            string symbol,
            string denom,
            uint256 totalSupply,
            uint8 decimals,
            string logoBase64
        ) external returns (address tokenAddress);
    }
}

sol! {
    #[sol(rpc)]
    interface IGovernance {
        struct TallyResultData {
            string yes;
            string abstain;
            string no;
            string no_with_veto;
        }

        struct ProposalData {
            uint64 id;
            address proposer;
            string title;
            string summary;
            string status;
            uint64 submitTime;
            uint64 votingStartTime;
            uint64 votingEndTime;
            TallyResultData currentTallyResult;
        }

        function getProposalsByPageAndSize(uint64 page, uint64 size)
            external
            view
            returns (ProposalData[] memory proposals);
    }
}
